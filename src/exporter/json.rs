// file: src/exporter/json.rs
// description: json run summary written next to the derived data artifacts
// reference: https://docs.rs/serde_json

use crate::error::{PipelineError, Result};
use crate::models::{OpenPorts, PipelineMode, PipelineOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub mode: PipelineMode,
    pub target_count: usize,
    pub outcome: String,
    pub active_ips: Vec<String>,
    pub open_ports: OpenPorts,
    pub service_report: Option<PathBuf>,
    pub started_at: String,
    pub finished_at: String,
}

impl RunSummary {
    pub fn new(
        mode: PipelineMode,
        target_count: usize,
        outcome: &PipelineOutcome,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let (open_ports, service_report) = match outcome {
            PipelineOutcome::Completed {
                open_ports,
                service_report,
                ..
            } => (open_ports.clone(), Some(service_report.clone())),
            _ => (OpenPorts::default(), None),
        };

        Self {
            mode,
            target_count,
            outcome: outcome.label().to_string(),
            active_ips: outcome.active_ips().to_vec(),
            open_ports,
            service_report,
            started_at: started_at.to_rfc3339(),
            finished_at: finished_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_path: PathBuf,
    pretty: bool,
}

impl JsonExporter {
    pub fn new(output_path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            output_path: output_path.into(),
            pretty,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn export(&self, summary: &RunSummary) -> Result<()> {
        let body = if self.pretty {
            serde_json::to_string_pretty(summary)
        } else {
            serde_json::to_string(summary)
        }
        .map_err(|e| PipelineError::Serialization(e.to_string()))?;

        fs::write(&self.output_path, body).map_err(|source| PipelineError::FileOperation {
            path: self.output_path.clone(),
            source,
        })?;

        info!("Run summary written to {}", self.output_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_export_completed_run() {
        let dir = tempdir().unwrap();
        let exporter = JsonExporter::new(dir.path().join("run_summary.json"), true);
        let outcome = PipelineOutcome::Completed {
            active_ips: vec!["10.0.0.1".to_string()],
            open_ports: OpenPorts {
                tcp: vec!["22".to_string(), "80".to_string()],
                udp: vec![],
            },
            service_report: PathBuf::from("/runs/service.xml"),
        };
        let now = Utc::now();
        let summary = RunSummary::new(PipelineMode::DefaultDiscovery, 3, &outcome, now, now);

        exporter.export(&summary).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(exporter.output_path()).unwrap()).unwrap();
        assert_eq!(written["mode"], "default_discovery");
        assert_eq!(written["outcome"], "completed");
        assert_eq!(written["target_count"], 3);
        assert_eq!(written["open_ports"]["tcp"][1], "80");
        assert_eq!(written["service_report"], "/runs/service.xml");
    }

    #[test]
    fn test_summary_for_empty_outcome() {
        let now = Utc::now();
        let summary = RunSummary::new(
            PipelineMode::FullDiscovery,
            1,
            &PipelineOutcome::NoActiveHosts,
            now,
            now,
        );

        assert_eq!(summary.outcome, "no_active_hosts");
        assert!(summary.active_ips.is_empty());
        assert!(summary.service_report.is_none());
    }
}
