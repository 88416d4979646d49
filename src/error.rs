// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Target error: {0}")]
    Target(String),

    #[error("{stage} could not be started: {source}")]
    ToolLaunch {
        stage: String,
        source: std::io::Error,
    },

    #[error("{stage} failed: {message}")]
    ExternalTool { stage: String, message: String },

    #[error("Failed to parse scan report {path}: {message}")]
    ArtifactParse { path: PathBuf, message: String },

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Vulnerability lookup error: {0}")]
    Vulnerability(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PipelineError {
    /// True for failures in operator input, raised before any stage runs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PipelineError::Config(_) | PipelineError::Target(_) | PipelineError::Validation(_)
        )
    }

    pub fn stage(&self) -> Option<&str> {
        match self {
            PipelineError::ToolLaunch { stage, .. } | PipelineError::ExternalTool { stage, .. } => {
                Some(stage)
            }
            _ => None,
        }
    }
}
