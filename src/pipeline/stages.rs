// file: src/pipeline/stages.rs
// description: builds the immutable launch profile for each scan stage
// reference: nmap timing and output options

use crate::config::ScannerConfig;
use crate::exporter::RunLayout;
use crate::models::{StageKind, StageProfile};

const PING_ARGS: &[&str] = &[
    "-sn",
    "-vvv",
    "--max-rtt-timeout",
    "100ms",
    "--open",
    "--host-timeout",
    "1m",
    "--max-scan-delay",
    "40ms",
    "--min-hostgroup",
    "256",
    "--max-retries",
    "0",
    "-PE",
    "-PP",
    "-PS21,22,25,445,138,80,443,8080",
    "-PA21,25",
    "-PU40100,161",
    "--disable-arp-ping",
    "-n",
];

const DISCOVERY_PORTS: &str =
    "T:22,80,443,445,1433,1521,2049,3306,5432,5984,6379,8080,8443,U:53,123,161,500,1434";

/// Scanner settings plus the run directory; the only input stage profiles
/// are derived from besides the hosts themselves.
#[derive(Debug, Clone)]
pub struct StageContext {
    nmap_path: String,
    min_rtt_timeout: String,
    max_rtt_timeout: String,
    layout: RunLayout,
}

impl StageContext {
    pub fn new(scanner: &ScannerConfig, layout: RunLayout) -> Self {
        Self {
            nmap_path: scanner.nmap_path.clone(),
            min_rtt_timeout: scanner.min_rtt_timeout.clone(),
            max_rtt_timeout: scanner.max_rtt_timeout.clone(),
            layout,
        }
    }

    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    pub fn discovery_ping(&self, targets: &[String]) -> StageProfile {
        let args = PING_ARGS.iter().map(|arg| arg.to_string()).collect();
        self.profile(StageKind::DiscoveryPing, args, targets)
    }

    pub fn discovery(&self, targets: &[String]) -> StageProfile {
        let mut args = strings(&[
            "-Pn",
            "-sT",
            "-sU",
            "-vvv",
            "--stats-every",
            "15s",
            "--min-rate",
            "500",
            "--max-rate",
            "1000",
            "--max-retries",
            "0",
            "--host-timeout",
            "30m",
            "--min-parallelism",
            "10",
            "--max-parallelism",
            "150",
            "--initial-rtt-timeout",
            "150ms",
        ]);
        self.push_rtt_bounds(&mut args);
        args.extend(strings(&["--max-scan-delay", "200ms", "-p", DISCOVERY_PORTS, "--reason"]));

        self.profile(StageKind::Discovery, args, targets)
    }

    pub fn tcp_port_discovery(&self, ips: &[String]) -> StageProfile {
        let mut args = strings(&[
            "-Pn",
            "-sT",
            "-vvv",
            "--stats-every",
            "15s",
            "-p-",
            "--min-rate",
            "800",
            "--max-rate",
            "1500",
            "--max-retries",
            "0",
            "--host-timeout",
            "30m",
            "--min-parallelism",
            "20",
            "--max-parallelism",
            "200",
            "--initial-rtt-timeout",
            "100ms",
        ]);
        self.push_rtt_bounds(&mut args);
        args.extend(strings(&["--max-scan-delay", "100ms", "--reason"]));

        self.profile(StageKind::TcpPortDiscovery, args, ips)
    }

    pub fn udp_port_discovery(&self, ips: &[String]) -> StageProfile {
        let mut args = strings(&[
            "-Pn",
            "-sU",
            "-vvv",
            "--stats-every",
            "15s",
            "--top-ports",
            "1000",
            "--min-rate",
            "500",
            "--max-rate",
            "1000",
            "--max-retries",
            "2",
            "--host-timeout",
            "30m",
            "--min-parallelism",
            "10",
            "--max-parallelism",
            "100",
            "--initial-rtt-timeout",
            "300ms",
        ]);
        self.push_rtt_bounds(&mut args);
        args.extend(strings(&["--max-scan-delay", "500ms", "--reason"]));

        self.profile(StageKind::UdpPortDiscovery, args, ips)
    }

    pub fn service_detection(&self, port_spec: &str, ips: &[String]) -> StageProfile {
        let args = strings(&[
            "-Pn",
            "-sV",
            "-vvv",
            "--stats-every",
            "15s",
            "-p",
            port_spec,
            "--version-intensity",
            "3",
            "--reason",
        ]);

        self.profile(StageKind::ServiceDetection, args, ips)
    }

    fn push_rtt_bounds(&self, args: &mut Vec<String>) {
        args.push("--min-rtt-timeout".to_string());
        args.push(self.min_rtt_timeout.clone());
        args.push("--max-rtt-timeout".to_string());
        args.push(self.max_rtt_timeout.clone());
    }

    /// Appends `-oA <base>` and the hosts, which always come last.
    fn profile(&self, kind: StageKind, mut args: Vec<String>, hosts: &[String]) -> StageProfile {
        let output_base = self.layout.stage_output_base(kind);

        args.push("-oA".to_string());
        args.push(output_base.to_string_lossy().into_owned());
        args.extend(hosts.iter().cloned());

        StageProfile::new(
            kind,
            self.nmap_path.clone(),
            args,
            output_base,
            self.layout.stage_log(kind),
        )
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}
