// file: src/extractor/mod.rs
// description: scan report reduction module exports
// reference: internal module structure

pub mod hosts;
pub mod ports;

pub use hosts::HostExtractor;
pub use ports::PortExtractor;
