// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod browser;
pub mod config;
pub mod database;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod models;
pub mod nvd;
pub mod pipeline;
pub mod utils;

pub use browser::Browser;
pub use config::{Config, DatabaseConfig, NvdConfig, OutputConfig, ScannerConfig};
pub use database::{LoadStats, SchemaManager, ServiceRecord, ServiceStore};
pub use error::{PipelineError, Result};
pub use exporter::{JsonExporter, RunLayout, RunSummary};
pub use extractor::{HostExtractor, PortExtractor};
pub use models::{
    NmapRun, OpenPorts, PipelineMode, PipelineOutcome, Protocol, StageKind, StageProfile,
    TargetList,
};
pub use nvd::{NvdClient, Vulnerability};
pub use pipeline::{
    PipelineOrchestrator, ReportSink, StageContext, StageRunner, Supervisor, stage_plan,
};
pub use utils::{OperationTimer, Validator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(PipelineMode::from_flags(false, false), PipelineMode::DefaultDiscovery);
    }
}
