// file: src/extractor/ports.rs
// description: open port extraction from tcp and udp port discovery reports
// reference: nmap port state semantics

use crate::error::Result;
use crate::exporter::text;
use crate::models::{NmapRun, OpenPorts, Protocol};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

pub struct PortExtractor;

impl PortExtractor {
    /// Ports of `protocol` in state exactly `open` across all hosts,
    /// deduplicated and ascending, rendered as decimal strings.
    pub fn open_ports(run: &NmapRun, protocol: Protocol) -> Vec<String> {
        run.hosts
            .iter()
            .flat_map(|host| host.ports())
            .filter(|port| port.protocol_matches(protocol) && port.is_open())
            .map(|port| port.port_id)
            .collect::<BTreeSet<u16>>()
            .into_iter()
            .map(|port| port.to_string())
            .collect()
    }

    pub fn extract(report: &Path, protocol: Protocol, artifact: &Path) -> Result<Vec<String>> {
        debug!(
            "Extracting open {} ports from {}",
            protocol.as_str().to_uppercase(),
            report.display()
        );

        let run = NmapRun::from_file(report)?;
        let ports = Self::open_ports(&run, protocol);
        text::write_lines(artifact, &ports)?;
        Ok(ports)
    }

    /// Both reports must parse before either artifact counts as produced.
    pub fn extract_open_ports(
        tcp_report: &Path,
        udp_report: &Path,
        tcp_artifact: &Path,
        udp_artifact: &Path,
    ) -> Result<OpenPorts> {
        let tcp = Self::extract(tcp_report, Protocol::Tcp, tcp_artifact)?;
        let udp = Self::extract(udp_report, Protocol::Udp, udp_artifact)?;

        info!("Open TCP ports discovered: [{}]", tcp.join(", "));
        info!("Open UDP ports discovered: [{}]", udp.join(", "));

        Ok(OpenPorts { tcp, udp })
    }
}
