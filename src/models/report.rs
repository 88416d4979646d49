// file: src/models/report.rs
// description: nmap xml report schema and report file loading
// reference: https://nmap.org/book/nmap-dtd.html

use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Partial model of `<nmaprun>`: only the host, address, port and service
/// elements the pipeline reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NmapRun {
    #[serde(rename = "host", default)]
    pub hosts: Vec<HostRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostRecord {
    pub status: HostStatus,

    #[serde(rename = "address", default)]
    pub addresses: Vec<Address>,

    #[serde(default)]
    pub ports: Option<Ports>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostStatus {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@reason", default)]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    #[serde(rename = "@addr")]
    pub addr: String,
    #[serde(rename = "@addrtype")]
    pub addr_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ports {
    #[serde(rename = "port", default)]
    pub ports: Vec<PortRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortRecord {
    #[serde(rename = "@protocol")]
    pub protocol: String,
    #[serde(rename = "@portid")]
    pub port_id: u16,
    pub state: PortState,
    #[serde(default)]
    pub service: Option<Service>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortState {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@reason", default)]
    pub reason: String,
    #[serde(rename = "@reason_ttl", default)]
    pub reason_ttl: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@product", default)]
    pub product: Option<String>,
    #[serde(rename = "@version", default)]
    pub version: Option<String>,
    #[serde(rename = "cpe", default)]
    pub cpes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NmapRun {
    /// Reads and parses a report. A missing file and malformed XML are both
    /// parse failures; nothing is returned partially.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PipelineError::ArtifactParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_xml(&content).map_err(|message| PipelineError::ArtifactParse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_xml(xml: &str) -> std::result::Result<Self, String> {
        quick_xml::de::from_str(xml).map_err(|e| e.to_string())
    }
}

impl HostRecord {
    pub fn is_up(&self) -> bool {
        self.status.state == "up"
    }

    pub fn first_ipv4(&self) -> Option<&str> {
        self.addresses
            .iter()
            .find(|address| address.addr_type == "ipv4")
            .map(|address| address.addr.as_str())
    }

    pub fn ports(&self) -> &[PortRecord] {
        self.ports.as_ref().map(|p| p.ports.as_slice()).unwrap_or(&[])
    }
}

impl PortRecord {
    pub fn is_open(&self) -> bool {
        self.state.state == "open"
    }

    pub fn protocol_matches(&self, protocol: Protocol) -> bool {
        self.protocol == protocol.as_str()
    }
}
