// file: src/nvd/mod.rs
// description: vulnerability lookup module exports
// reference: internal module structure

pub mod client;
pub mod cpe;

pub use client::{NvdClient, Vulnerability};
