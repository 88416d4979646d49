// file: src/models/stage.rs
// description: scan stage kinds and the immutable per-invocation stage profile
// reference: nmap output options (-oA)

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    DiscoveryPing,
    Discovery,
    TcpPortDiscovery,
    UdpPortDiscovery,
    ServiceDetection,
}

impl StageKind {
    pub const ALL: [StageKind; 5] = [
        StageKind::DiscoveryPing,
        StageKind::Discovery,
        StageKind::TcpPortDiscovery,
        StageKind::UdpPortDiscovery,
        StageKind::ServiceDetection,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StageKind::DiscoveryPing => "Discovery Ping Scan",
            StageKind::Discovery => "Nmap Discovery Scan",
            StageKind::TcpPortDiscovery => "TCP port discovery scan",
            StageKind::UdpPortDiscovery => "UDP port discovery scan",
            StageKind::ServiceDetection => "Service detection scan",
        }
    }

    /// Directory under `nmap_output/` holding this stage's reports.
    pub fn dir_name(&self) -> &'static str {
        match self {
            StageKind::DiscoveryPing => "discovery_ping",
            StageKind::Discovery => "discovery",
            StageKind::TcpPortDiscovery => "tcp_port_discovery",
            StageKind::UdpPortDiscovery => "udp_port_discovery",
            StageKind::ServiceDetection => "service_detection",
        }
    }

    /// Report base name; nmap appends `.xml`, `.nmap` and `.gnmap`.
    pub fn output_stem(&self) -> &'static str {
        match self {
            StageKind::DiscoveryPing => "nmap_discovery_ping_scan_results",
            StageKind::Discovery => "nmap_discovery_scan_results",
            StageKind::TcpPortDiscovery => "nmap_tcp_port_discovery_results",
            StageKind::UdpPortDiscovery => "nmap_udp_port_discovery_results",
            StageKind::ServiceDetection => "nmap_service_detection_results",
        }
    }

    pub fn log_file_name(&self) -> String {
        format!("verbose_nmap_{}_output.txt", self.dir_name())
    }

    pub fn progress_message(&self) -> String {
        format!("{} in progress...", self.name())
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to launch one stage. Built fresh for every invocation
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageProfile {
    kind: StageKind,
    program: String,
    args: Vec<String>,
    output_base: PathBuf,
    verbose_log: PathBuf,
    message: String,
}

impl StageProfile {
    pub fn new(
        kind: StageKind,
        program: impl Into<String>,
        args: Vec<String>,
        output_base: PathBuf,
        verbose_log: PathBuf,
    ) -> Self {
        Self {
            kind,
            program: program.into(),
            args,
            output_base,
            verbose_log,
            message: kind.progress_message(),
        }
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn output_base(&self) -> &PathBuf {
        &self.output_base
    }

    pub fn verbose_log(&self) -> &PathBuf {
        &self.verbose_log
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Path of the XML report the stage leaves behind.
    pub fn report_path(&self) -> PathBuf {
        let mut path = OsString::from(self.output_base.as_os_str());
        path.push(".xml");
        PathBuf::from(path)
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
