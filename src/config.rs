// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub output: OutputConfig,
    pub database: DatabaseConfig,
    pub nvd: NvdConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
    pub nmap_path: String,
    pub min_rtt_timeout: String,
    pub max_rtt_timeout: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub base_dir: PathBuf,
    pub run_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NvdConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub results_per_page: u32,
}

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

impl Config {
    /// Loads settings from `path`, or from `config/default.toml` when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_layered(path, Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Built-in defaults, then the TOML file, then `RECON_PIPELINE__*` variables.
    /// An explicit `path` must exist; `default_path` may be absent.
    pub fn load_layered(path: Option<&Path>, default_path: &Path) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(default_path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("RECON_PIPELINE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            scanner: ScannerConfig {
                nmap_path: "nmap".to_string(),
                min_rtt_timeout: "50ms".to_string(),
                max_rtt_timeout: "250ms".to_string(),
            },
            output: OutputConfig {
                base_dir: PathBuf::from("."),
                run_prefix: "Scan".to_string(),
            },
            database: DatabaseConfig {
                path: PathBuf::from("vuln_scanner.db"),
            },
            nvd: NvdConfig {
                api_url: "https://services.nvd.nist.gov/rest/json/cves/2.0".to_string(),
                api_key: None,
                timeout_secs: 10,
                results_per_page: 20,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.scanner.nmap_path.trim().is_empty() {
            return Err(PipelineError::Config(
                "scanner.nmap_path must not be empty".to_string(),
            ));
        }

        Validator::validate_rtt_bounds(&self.scanner.min_rtt_timeout, &self.scanner.max_rtt_timeout)
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        if self.output.run_prefix.trim().is_empty() {
            return Err(PipelineError::Config(
                "output.run_prefix must not be empty".to_string(),
            ));
        }

        Validator::validate_url(&self.nvd.api_url)
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        if self.nvd.results_per_page == 0 || self.nvd.results_per_page > 2000 {
            return Err(PipelineError::Config(
                "nvd.results_per_page must be between 1 and 2000".to_string(),
            ));
        }

        Ok(())
    }
}
