// file: src/pipeline/orchestrator.rs
// description: runs the stage sequence for the selected mode and threads derived sets forward
// reference: one handler per pipeline mode, fail-fast on any stage error

use crate::error::Result;
use crate::extractor::{HostExtractor, PortExtractor};
use crate::models::{PipelineMode, PipelineOutcome, StageKind, StageProfile, TargetList};
use crate::pipeline::stages::StageContext;
use std::future::Future;
use std::path::Path;
use tracing::{info, warn};

/// Runs one stage to completion.
pub trait StageRunner {
    fn run(&self, profile: &StageProfile) -> impl Future<Output = Result<()>> + Send;
}

/// Receives the final service detection report.
pub trait ReportSink {
    fn load_report(&self, report: &Path) -> Result<()>;
}

pub struct PipelineOrchestrator<'a, R, S> {
    context: &'a StageContext,
    runner: &'a R,
    sink: &'a S,
}

impl<'a, R, S> PipelineOrchestrator<'a, R, S>
where
    R: StageRunner,
    S: ReportSink,
{
    pub fn new(context: &'a StageContext, runner: &'a R, sink: &'a S) -> Self {
        Self {
            context,
            runner,
            sink,
        }
    }

    pub async fn run(&self, mode: PipelineMode, targets: &TargetList) -> Result<PipelineOutcome> {
        info!("Starting {} pipeline against {} targets", mode, targets.len());

        match mode {
            PipelineMode::PingOnly => self.ping_only(targets).await,
            PipelineMode::FullDiscovery => self.full_discovery(targets).await,
            PipelineMode::DefaultDiscovery => self.default_discovery(targets).await,
        }
    }

    async fn ping_only(&self, targets: &TargetList) -> Result<PipelineOutcome> {
        let active_ips = self.ping_discovery(targets.as_slice()).await?;

        if active_ips.is_empty() {
            warn!("No active hosts responded to the ping scan");
            return Ok(PipelineOutcome::NoActiveHosts);
        }
        Ok(PipelineOutcome::PingCompleted { active_ips })
    }

    async fn full_discovery(&self, targets: &TargetList) -> Result<PipelineOutcome> {
        let ping_ips = self.ping_discovery(targets.as_slice()).await?;
        if ping_ips.is_empty() {
            warn!("No active hosts responded to the ping scan, skipping discovery");
            return Ok(PipelineOutcome::NoActiveHosts);
        }

        let active_ips = self.discovery(&ping_ips).await?;
        self.scan_ports(active_ips).await
    }

    async fn default_discovery(&self, targets: &TargetList) -> Result<PipelineOutcome> {
        let active_ips = self.discovery(targets.as_slice()).await?;
        self.scan_ports(active_ips).await
    }

    async fn ping_discovery(&self, targets: &[String]) -> Result<Vec<String>> {
        let profile = self.context.discovery_ping(targets);
        self.runner.run(&profile).await?;

        HostExtractor::extract(
            &profile.report_path(),
            &self.context.layout().active_ping_ips_file(),
        )
    }

    async fn discovery(&self, targets: &[String]) -> Result<Vec<String>> {
        let profile = self.context.discovery(targets);
        self.runner.run(&profile).await?;

        HostExtractor::extract(&profile.report_path(), &self.context.layout().active_ips_file())
    }

    async fn scan_ports(&self, active_ips: Vec<String>) -> Result<PipelineOutcome> {
        if active_ips.is_empty() {
            warn!("No active hosts found, skipping port discovery");
            return Ok(PipelineOutcome::NoActiveHosts);
        }

        let tcp = self.context.tcp_port_discovery(&active_ips);
        self.runner.run(&tcp).await?;

        let udp = self.context.udp_port_discovery(&active_ips);
        self.runner.run(&udp).await?;

        let layout = self.context.layout();
        let open_ports = PortExtractor::extract_open_ports(
            &tcp.report_path(),
            &udp.report_path(),
            &layout.open_tcp_ports_file(),
            &layout.open_udp_ports_file(),
        )?;

        let Some(port_spec) = open_ports.port_spec() else {
            warn!("No open ports found, skipping service detection");
            return Ok(PipelineOutcome::NoOpenPorts { active_ips });
        };

        let services = self.context.service_detection(&port_spec, &active_ips);
        self.runner.run(&services).await?;

        let service_report = services.report_path();
        info!("Loading {} into the service store", service_report.display());
        self.sink.load_report(&service_report)?;

        Ok(PipelineOutcome::Completed {
            active_ips,
            open_ports,
            service_report,
        })
    }
}

/// Stage kinds a run in `mode` can invoke, in order.
pub fn stage_plan(mode: PipelineMode) -> &'static [StageKind] {
    match mode {
        PipelineMode::PingOnly => &[StageKind::DiscoveryPing],
        PipelineMode::FullDiscovery => &StageKind::ALL,
        PipelineMode::DefaultDiscovery => &[
            StageKind::Discovery,
            StageKind::TcpPortDiscovery,
            StageKind::UdpPortDiscovery,
            StageKind::ServiceDetection,
        ],
    }
}
