// file: src/exporter/mod.rs
// description: run output module exports
// reference: internal module structure

pub mod json;
pub mod layout;
pub mod text;

pub use json::{JsonExporter, RunSummary};
pub use layout::RunLayout;
