// file: src/extractor/hosts.rs
// description: active host extraction from discovery reports
// reference: nmap host status semantics

use crate::error::Result;
use crate::exporter::text;
use crate::models::NmapRun;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

pub struct HostExtractor;

impl HostExtractor {
    /// First ipv4 address of every host reported up, deduplicated by exact
    /// string match in first-seen order. Hosts without an ipv4 address are
    /// skipped.
    pub fn active_ips(run: &NmapRun) -> Vec<String> {
        let mut seen = HashSet::new();

        run.hosts
            .iter()
            .filter(|host| host.is_up())
            .filter_map(|host| host.first_ipv4())
            .filter(|ip| seen.insert(*ip))
            .map(str::to_string)
            .collect()
    }

    /// Parses `report`, writes the active set to `artifact` and returns it.
    pub fn extract(report: &Path, artifact: &Path) -> Result<Vec<String>> {
        debug!("Extracting active IP addresses from {}", report.display());

        let run = NmapRun::from_file(report)?;
        let active_ips = Self::active_ips(&run);

        text::write_lines(artifact, &active_ips)?;

        info!(
            "{} active IPs discovered, saved to {}",
            active_ips.len(),
            artifact.display()
        );
        Ok(active_ips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::models::report::fixtures::report_xml;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_duplicates_and_down_hosts_excluded() {
        let xml = report_xml(&[
            ("up", Some("10.0.0.1"), &[]),
            ("down", Some("10.0.0.2"), &[]),
            ("up", Some("10.0.0.1"), &[]),
        ]);
        let run = NmapRun::from_xml(&xml).unwrap();

        let ips: HashSet<String> = HostExtractor::active_ips(&run).into_iter().collect();
        assert_eq!(ips, HashSet::from(["10.0.0.1".to_string()]));
    }

    #[test]
    fn test_host_without_ipv4_contributes_nothing() {
        let xml = r#"<nmaprun>
<host><status state="up"/><address addr="fe80::1" addrtype="ipv6"/><address addr="00:11:22:33:44:55" addrtype="mac"/></host>
<host><status state="up"/><address addr="08:00:27:00:00:01" addrtype="mac"/><address addr="10.0.0.9" addrtype="ipv4"/></host>
</nmaprun>"#;
        let run = NmapRun::from_xml(xml).unwrap();

        assert_eq!(HostExtractor::active_ips(&run), vec!["10.0.0.9"]);
    }

    #[test]
    fn test_extract_persists_artifact() {
        let temp = TempDir::new().unwrap();
        let report = temp.path().join("discovery.xml");
        let artifact = temp.path().join("ips_active.txt");
        fs::write(
            &report,
            report_xml(&[("up", Some("10.0.0.3"), &[]), ("up", Some("10.0.0.4"), &[])]),
        )
        .unwrap();

        let ips = HostExtractor::extract(&report, &artifact).unwrap();

        let persisted: HashSet<String> = text::read_lines(&artifact).unwrap().into_iter().collect();
        let returned: HashSet<String> = ips.into_iter().collect();
        assert_eq!(persisted, returned);
        assert_eq!(returned.len(), 2);
    }

    #[test]
    fn test_missing_report_fails_without_artifact() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("ips_active.txt");

        let err = HostExtractor::extract(&temp.path().join("missing.xml"), &artifact).unwrap_err();

        assert!(matches!(err, PipelineError::ArtifactParse { .. }));
        assert!(!artifact.exists());
    }

    #[test]
    fn test_malformed_report_fails() {
        let temp = TempDir::new().unwrap();
        let report = temp.path().join("broken.xml");
        fs::write(&report, "<nmaprun><host><status state=\"up\"/>").unwrap();

        let err =
            HostExtractor::extract(&report, &temp.path().join("ips_active.txt")).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactParse { .. }));
    }
}
