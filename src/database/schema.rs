// file: src/database/schema.rs
// description: SQLite schema for detected services and their platform identifiers
// reference: https://docs.rs/rusqlite

use crate::error::Result;
use rusqlite::Connection;
use tracing::debug;

const SERVICES_TABLE: &str = "CREATE TABLE IF NOT EXISTS services (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ip TEXT NOT NULL,
    service_name TEXT NOT NULL,
    product TEXT,
    version TEXT,
    protocol TEXT NOT NULL,
    port INTEGER NOT NULL
)";

const CPE_MAPPINGS_TABLE: &str = "CREATE TABLE IF NOT EXISTS cpe_mappings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_id INTEGER NOT NULL REFERENCES services(id) ON DELETE CASCADE,
    cpe TEXT NOT NULL
)";

const SERVICE_NAME_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_services_name ON services(service_name)";

const CPE_SERVICE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_cpe_mappings_service ON cpe_mappings(service_id)";

pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Safe to run against an existing store.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        for statement in [
            SERVICES_TABLE,
            CPE_MAPPINGS_TABLE,
            SERVICE_NAME_INDEX,
            CPE_SERVICE_INDEX,
        ] {
            self.conn.execute(statement, [])?;
        }

        debug!("Service store schema ready");
        Ok(())
    }
}
