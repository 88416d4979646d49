// file: src/models/mode.rs
// description: pipeline mode selection and run outcome types
// reference: https://docs.rs/serde

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Chosen once at start-up; decides which discovery stages run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    PingOnly,
    FullDiscovery,
    DefaultDiscovery,
}

impl PipelineMode {
    pub fn from_flags(ping: bool, full_discovery: bool) -> Self {
        match (ping, full_discovery) {
            (true, _) => PipelineMode::PingOnly,
            (false, true) => PipelineMode::FullDiscovery,
            (false, false) => PipelineMode::DefaultDiscovery,
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineMode::PingOnly => "ping only",
            PipelineMode::FullDiscovery => "full discovery",
            PipelineMode::DefaultDiscovery => "default discovery",
        };
        f.write_str(label)
    }
}

/// Open ports from the two port-discovery stages, ascending, as decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpenPorts {
    pub tcp: Vec<String>,
    pub udp: Vec<String>,
}

impl OpenPorts {
    pub fn is_empty(&self) -> bool {
        self.tcp.is_empty() && self.udp.is_empty()
    }

    /// `T:<tcp>`, `U:<udp>` or both joined with a comma. `None` when no
    /// ports are open.
    pub fn port_spec(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(2);
        if !self.tcp.is_empty() {
            parts.push(format!("T:{}", self.tcp.join(",")));
        }
        if !self.udp.is_empty() {
            parts.push(format!("U:{}", self.udp.join(",")));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(","))
        }
    }
}

/// How a successful run ended. Empty results are outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    PingCompleted {
        active_ips: Vec<String>,
    },
    NoActiveHosts,
    NoOpenPorts {
        active_ips: Vec<String>,
    },
    Completed {
        active_ips: Vec<String>,
        open_ports: OpenPorts,
        service_report: PathBuf,
    },
}

impl PipelineOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineOutcome::PingCompleted { .. } => "ping_completed",
            PipelineOutcome::NoActiveHosts => "no_active_hosts",
            PipelineOutcome::NoOpenPorts { .. } => "no_open_ports",
            PipelineOutcome::Completed { .. } => "completed",
        }
    }

    pub fn active_ips(&self) -> &[String] {
        match self {
            PipelineOutcome::PingCompleted { active_ips }
            | PipelineOutcome::NoOpenPorts { active_ips }
            | PipelineOutcome::Completed { active_ips, .. } => active_ips,
            PipelineOutcome::NoActiveHosts => &[],
        }
    }

    pub fn has_findings(&self) -> bool {
        matches!(self, PipelineOutcome::Completed { .. })
    }
}
