// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

pub mod orchestrator;
pub mod progress;
pub mod stages;
pub mod supervisor;

pub use orchestrator::{PipelineOrchestrator, ReportSink, StageRunner, stage_plan};
pub use progress::{Completion, ProgressDisplay, ProgressEstimator};
pub use stages::StageContext;
pub use supervisor::Supervisor;
