// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod mode;
pub mod report;
pub mod stage;
pub mod target;

pub use mode::{OpenPorts, PipelineMode, PipelineOutcome};
pub use report::{Address, HostRecord, NmapRun, PortRecord, PortState, Protocol, Service};
pub use stage::{StageKind, StageProfile};
pub use target::TargetList;
