// file: src/utils/validation.rs
// description: operator input validation for targets, timing specs, and paths
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub struct Validator;

impl Validator {
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let canonical = fs::canonicalize(path).map_err(|e| {
            PipelineError::Validation(format!(
                "Cannot canonicalize path {}: {}",
                path.display(),
                e
            ))
        })?;

        if !canonical.is_file() {
            return Err(PipelineError::Validation(format!(
                "Path is not a file: {}",
                canonical.display()
            )));
        }

        Ok(())
    }

    /// Parses an nmap time specification such as `250ms`, `1.5s`, `30m` or a bare
    /// number of seconds.
    pub fn parse_time_spec(spec: &str) -> Result<Duration> {
        let spec = spec.trim();
        let split = spec
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(spec.len());
        let (number, unit) = spec.split_at(split);

        let value: f64 = number.parse().map_err(|_| {
            PipelineError::Validation(format!("Invalid time value: '{}'", spec))
        })?;

        let seconds = match unit {
            "" | "s" => value,
            "ms" => value / 1000.0,
            "m" => value * 60.0,
            "h" => value * 3600.0,
            _ => {
                return Err(PipelineError::Validation(format!(
                    "Invalid time unit in '{}' (expected ms, s, m or h)",
                    spec
                )));
            }
        };

        Duration::try_from_secs_f64(seconds).map_err(|_| {
            PipelineError::Validation(format!("Time value out of range: '{}'", spec))
        })
    }

    pub fn validate_rtt_bounds(min: &str, max: &str) -> Result<()> {
        let min_duration = Self::parse_time_spec(min)?;
        let max_duration = Self::parse_time_spec(max)?;

        if min_duration > max_duration {
            return Err(PipelineError::Validation(format!(
                "Minimum RTT timeout ({}) exceeds maximum RTT timeout ({})",
                min, max
            )));
        }

        Ok(())
    }

    pub fn validate_target(target: &str) -> Result<()> {
        if target.is_empty() {
            return Err(PipelineError::Target("Empty target".to_string()));
        }

        if target.starts_with('-') {
            return Err(PipelineError::Target(format!(
                "Target '{}' looks like a command-line option",
                target
            )));
        }

        if target.chars().any(char::is_whitespace) {
            return Err(PipelineError::Target(format!(
                "Target '{}' contains whitespace",
                target
            )));
        }

        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }
}
