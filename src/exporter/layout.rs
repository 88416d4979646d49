// file: src/exporter/layout.rs
// description: timestamped run directory layout for reports, logs and derived data
// reference: https://docs.rs/chrono

use crate::error::{PipelineError, Result};
use crate::models::StageKind;
use chrono::{DateTime, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ACTIVE_IPS_FILE: &str = "ips_active.txt";
pub const ACTIVE_PING_IPS_FILE: &str = "ips_active_ping.txt";
pub const OPEN_TCP_PORTS_FILE: &str = "ports_open_tcp.txt";
pub const OPEN_UDP_PORTS_FILE: &str = "ports_open_udp.txt";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// `<prefix>_<timestamp>/` with `logs/`, `data/` and one `nmap_output/`
/// directory per stage. All paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
    logs_dir: PathBuf,
    data_dir: PathBuf,
    nmap_output_dir: PathBuf,
}

impl RunLayout {
    pub fn create<Tz: TimeZone>(base: &Path, prefix: &str, started: &DateTime<Tz>) -> Result<Self>
    where
        Tz::Offset: std::fmt::Display,
    {
        let run_name = format!("{}_{}", prefix, started.format("%Y%m%d_%H%M%S"));
        let root = std::path::absolute(base.join(run_name)).map_err(|source| {
            PipelineError::FileOperation {
                path: base.to_path_buf(),
                source,
            }
        })?;

        let layout = Self {
            logs_dir: root.join("logs"),
            data_dir: root.join("data"),
            nmap_output_dir: root.join("nmap_output"),
            root,
        };

        let mut dirs = vec![layout.logs_dir.clone(), layout.data_dir.clone()];
        dirs.extend(StageKind::ALL.iter().map(|kind| layout.stage_dir(*kind)));

        for dir in dirs {
            fs::create_dir_all(&dir).map_err(|source| PipelineError::FileOperation {
                path: dir.clone(),
                source,
            })?;
        }

        debug!("Created run directory {}", layout.root.display());
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stage_dir(&self, kind: StageKind) -> PathBuf {
        self.nmap_output_dir.join(kind.dir_name())
    }

    pub fn stage_output_base(&self, kind: StageKind) -> PathBuf {
        self.stage_dir(kind).join(kind.output_stem())
    }

    pub fn stage_log(&self, kind: StageKind) -> PathBuf {
        self.logs_dir.join(kind.log_file_name())
    }

    pub fn active_ips_file(&self) -> PathBuf {
        self.data_dir.join(ACTIVE_IPS_FILE)
    }

    pub fn active_ping_ips_file(&self) -> PathBuf {
        self.data_dir.join(ACTIVE_PING_IPS_FILE)
    }

    pub fn open_tcp_ports_file(&self) -> PathBuf {
        self.data_dir.join(OPEN_TCP_PORTS_FILE)
    }

    pub fn open_udp_ports_file(&self) -> PathBuf {
        self.data_dir.join(OPEN_UDP_PORTS_FILE)
    }

    pub fn summary_file(&self) -> PathBuf {
        self.data_dir.join(RUN_SUMMARY_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_create_layout() {
        let temp = TempDir::new().unwrap();
        let started = Utc.with_ymd_and_hms(2026, 10, 18, 9, 5, 7).unwrap();

        let layout = RunLayout::create(temp.path(), "Scan", &started).unwrap();

        assert!(layout.root().is_absolute());
        assert!(layout.root().ends_with("Scan_20261018_090507"));
        let logs = layout.stage_log(StageKind::Discovery);
        assert!(logs.parent().is_some_and(Path::is_dir));
        let data = layout.summary_file();
        assert!(data.parent().is_some_and(Path::is_dir));
        for kind in StageKind::ALL {
            assert!(layout.stage_dir(kind).is_dir(), "{} missing", kind);
        }

        assert!(
            layout
                .stage_output_base(StageKind::ServiceDetection)
                .ends_with("nmap_output/service_detection/nmap_service_detection_results")
        );
        assert!(
            layout
                .stage_log(StageKind::Discovery)
                .ends_with("logs/verbose_nmap_discovery_output.txt")
        );
        assert!(layout.active_ips_file().ends_with("data/ips_active.txt"));
    }
}
