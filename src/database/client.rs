// file: src/database/client.rs
// description: SQLite service store with connection management and read queries
// reference: https://docs.rs/rusqlite

use crate::database::schema::SchemaManager;
use crate::error::{PipelineError, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// One detected service on one host port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRecord {
    pub id: i64,
    pub ip: String,
    pub service_name: String,
    pub product: Option<String>,
    pub version: Option<String>,
    pub protocol: String,
    pub port: u16,
}

impl ServiceRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            ip: row.get(1)?,
            service_name: row.get(2)?,
            product: row.get(3)?,
            version: row.get(4)?,
            protocol: row.get(5)?,
            port: row.get(6)?,
        })
    }

    /// `product version`, whichever parts are known.
    pub fn display_version(&self) -> String {
        [self.product.as_deref(), self.version.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

const SERVICE_COLUMNS: &str = "id, ip, service_name, product, version, protocol, port";

pub struct ServiceStore {
    pub(crate) conn: Connection,
}

impl ServiceStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PipelineError::FileOperation {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        info!("Opening service store at {}", path.display());
        let conn = Connection::open(path)?;
        SchemaManager::new(&conn).initialize()?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        SchemaManager::new(&conn).initialize()?;
        Ok(Self { conn })
    }

    pub fn list_services(&self) -> Result<Vec<ServiceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM services ORDER BY ip, protocol, port, id",
            SERVICE_COLUMNS
        ))?;
        let rows = stmt.query_map([], ServiceRecord::from_row)?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Case-insensitive substring match on the service name.
    pub fn search_services(&self, name: &str) -> Result<Vec<ServiceRecord>> {
        let pattern = format!("%{}%", name.trim());
        debug!("Searching services matching {}", pattern);

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM services WHERE service_name LIKE ?1 ORDER BY ip, protocol, port, id",
            SERVICE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![pattern], ServiceRecord::from_row)?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn service(&self, id: i64) -> Result<Option<ServiceRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM services WHERE id = ?1", SERVICE_COLUMNS),
                params![id],
                ServiceRecord::from_row,
            )
            .optional()?;
        Ok(record)
    }

    pub fn cpes_for_service(&self, service_id: i64) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT cpe FROM cpe_mappings WHERE service_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![service_id], |row| row.get::<_, String>(0))?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn service_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(store: &ServiceStore) {
        store
            .conn
            .execute_batch(
                "INSERT INTO services (ip, service_name, product, version, protocol, port)
                 VALUES ('10.0.0.2', 'ssh', 'OpenSSH', '8.9p1', 'tcp', 22);
                 INSERT INTO services (ip, service_name, product, version, protocol, port)
                 VALUES ('10.0.0.1', 'http', 'nginx', NULL, 'tcp', 80);
                 INSERT INTO services (ip, service_name, product, version, protocol, port)
                 VALUES ('10.0.0.1', 'HTTPS', NULL, NULL, 'tcp', 443);
                 INSERT INTO cpe_mappings (service_id, cpe) VALUES (1, 'cpe:/a:openbsd:openssh:8.9p1');
                 INSERT INTO cpe_mappings (service_id, cpe) VALUES (1, 'cpe:/o:linux:linux_kernel');",
            )
            .unwrap();
    }

    #[test]
    fn test_list_and_lookup() {
        let store = ServiceStore::open_in_memory().unwrap();
        seed(&store);

        let services = store.list_services().unwrap();
        let ports: Vec<u16> = services.iter().map(|s| s.port).collect();
        assert_eq!(ports, vec![80, 443, 22]);

        let ssh = store.service(1).unwrap().unwrap();
        assert_eq!(ssh.service_name, "ssh");
        assert_eq!(ssh.display_version(), "OpenSSH 8.9p1");
        assert!(store.service(99).unwrap().is_none());
        assert_eq!(store.service_count().unwrap(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let store = ServiceStore::open_in_memory().unwrap();
        seed(&store);

        let names: Vec<String> = store
            .search_services("http")
            .unwrap()
            .into_iter()
            .map(|s| s.service_name)
            .collect();
        assert_eq!(names, vec!["http", "HTTPS"]);
        assert!(store.search_services("telnet").unwrap().is_empty());
    }

    #[test]
    fn test_cpes_for_service() {
        let store = ServiceStore::open_in_memory().unwrap();
        seed(&store);

        assert_eq!(
            store.cpes_for_service(1).unwrap(),
            vec!["cpe:/a:openbsd:openssh:8.9p1", "cpe:/o:linux:linux_kernel"]
        );
        assert!(store.cpes_for_service(2).unwrap().is_empty());
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("vuln_scanner.db");

        let store = ServiceStore::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(store.service_count().unwrap(), 0);
    }
}
