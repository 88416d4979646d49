// file: src/database/insert.rs
// description: loads a service detection report into the service store in one transaction
// reference: https://docs.rs/rusqlite

use crate::database::client::ServiceStore;
use crate::error::Result;
use crate::models::NmapRun;
use crate::pipeline::ReportSink;
use rusqlite::params;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub services_inserted: usize,
    pub cpes_inserted: usize,
    pub hosts_skipped: usize,
}

impl ServiceStore {
    /// Inserts one service row per port entry that carries a service element,
    /// plus one mapping row per identifier string on it. Nothing is kept if
    /// any insert fails.
    pub fn load_run(&self, run: &NmapRun) -> Result<LoadStats> {
        let tx = self.conn.unchecked_transaction()?;
        let mut stats = LoadStats::default();

        {
            let mut insert_service = tx.prepare(
                "INSERT INTO services (ip, service_name, product, version, protocol, port)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            let mut insert_cpe =
                tx.prepare("INSERT INTO cpe_mappings (service_id, cpe) VALUES (?1, ?2)")?;

            for host in &run.hosts {
                let Some(ip) = host.first_ipv4() else {
                    stats.hosts_skipped += 1;
                    continue;
                };

                for port in host.ports() {
                    let Some(service) = &port.service else {
                        continue;
                    };

                    let service_id = insert_service.insert(params![
                        ip,
                        service.name,
                        service.product,
                        service.version,
                        port.protocol,
                        port.port_id,
                    ])?;
                    stats.services_inserted += 1;

                    for cpe in service.cpes.iter().filter(|cpe| !cpe.trim().is_empty()) {
                        insert_cpe.execute(params![service_id, cpe.trim()])?;
                        stats.cpes_inserted += 1;
                    }
                    debug!(
                        "Stored {} on {}:{}/{}",
                        service.name, ip, port.port_id, port.protocol
                    );
                }
            }
        }

        tx.commit()?;

        if stats.hosts_skipped > 0 {
            warn!("{} hosts without an IPv4 address were not stored", stats.hosts_skipped);
        }
        Ok(stats)
    }

    pub fn load_file(&self, report: &Path) -> Result<LoadStats> {
        let run = NmapRun::from_file(report)?;
        let stats = self.load_run(&run)?;

        info!(
            "Loaded {} services and {} CPE mappings from {}",
            stats.services_inserted,
            stats.cpes_inserted,
            report.display()
        );
        Ok(stats)
    }
}

impl ReportSink for ServiceStore {
    fn load_report(&self, report: &Path) -> Result<()> {
        self.load_file(report).map(|_| ())
    }
}
