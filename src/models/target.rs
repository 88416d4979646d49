// file: src/models/target.rs
// description: scan target collection from target files or command-line arguments
// reference: nmap target specification

use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Ordered list of hostnames, addresses or ranges handed to the first stage.
/// Duplicates are kept; the scanner deduplicates on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetList {
    targets: Vec<String>,
}

impl TargetList {
    pub fn new(targets: Vec<String>) -> Result<Self> {
        if targets.is_empty() {
            return Err(PipelineError::Target("no valid targets provided".to_string()));
        }

        for target in &targets {
            Validator::validate_target(target)?;
        }

        Ok(Self { targets })
    }

    /// A target file takes precedence over positional targets.
    pub fn collect(file: Option<&Path>, positional: &[String]) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None if !positional.is_empty() => Self::new(
                positional
                    .iter()
                    .map(|target| target.trim().to_string())
                    .filter(|target| !target.is_empty())
                    .collect(),
            ),
            None => Err(PipelineError::Target(
                "no targets provided; pass targets as arguments or use -f <file>".to_string(),
            )),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Target(format!("target file '{}' not readable: {}", path.display(), e))
        })?;

        let targets = Self::parse(&content);
        debug!("Read {} targets from {}", targets.len(), path.display());
        Self::new(targets)
    }

    /// One target per line; blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Vec<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let content = "# lab network\n10.0.0.1\n\n   \n  10.0.0.0/28  \n#10.0.0.99\nscanme.nmap.org\n";
        assert_eq!(
            TargetList::parse(content),
            vec!["10.0.0.1", "10.0.0.0/28", "scanme.nmap.org"]
        );
    }

    #[test]
    fn test_file_takes_precedence() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("targets.txt");
        fs::write(&path, "192.168.1.10\n192.168.1.11\n").unwrap();

        let targets = TargetList::collect(Some(&path), &["10.0.0.1".to_string()]).unwrap();
        assert_eq!(targets.as_slice(), &["192.168.1.10", "192.168.1.11"]);
    }

    #[test]
    fn test_positional_targets() {
        let targets =
            TargetList::collect(None, &["10.0.0.1".to_string(), "10.0.0.1".to_string()]).unwrap();
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_missing_targets_is_configuration_error() {
        let err = TargetList::collect(None, &[]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = TargetList::collect(Some(Path::new("/nonexistent/targets.txt")), &[]).unwrap_err();
        assert!(matches!(err, PipelineError::Target(_)));
    }

    #[test]
    fn test_comment_only_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("targets.txt");
        fs::write(&path, "# nothing yet\n\n").unwrap();

        assert!(TargetList::from_file(&path).is_err());
    }
}
