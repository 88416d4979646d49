// file: src/database/mod.rs
// description: database operations module exports
// reference: internal module structure

pub mod client;
pub mod insert;
pub mod schema;

pub use client::{ServiceRecord, ServiceStore};
pub use insert::LoadStats;
pub use schema::SchemaManager;
