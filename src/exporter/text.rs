// file: src/exporter/text.rs
// description: newline-delimited provenance artifacts for active hosts and open ports
// reference: https://doc.rust-lang.org/std/fs

use crate::error::{PipelineError, Result};
use std::fs;
use std::path::Path;

/// Writes one value per line. No header and no trailing newline.
pub fn write_lines(path: &Path, values: &[String]) -> Result<()> {
    fs::write(path, values.join("\n")).map_err(|source| PipelineError::FileOperation {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a newline-delimited artifact, skipping blank lines.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| PipelineError::FileOperation {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
