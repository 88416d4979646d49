// file: src/main.rs
// description: commandline application entry point with scan and load handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{ArgAction, Parser};
use recon_pipeline::browser::Browser;
use recon_pipeline::utils::logging::{
    format_error, format_info, format_step, format_success, format_warning, init_logger,
};
use recon_pipeline::{
    Config, PipelineError, JsonExporter, NvdClient, PipelineMode, PipelineOrchestrator, PipelineOutcome,
    RunLayout, RunSummary, ServiceStore, StageContext, Supervisor, TargetList, Validator,
    stage_plan,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "recon_pipeline")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Staged nmap discovery, port and service scanning with a local service store", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Echo scanner output as it arrives
    #[arg(long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Ping discovery only, no port scanning
    #[arg(long, conflicts_with = "fulldisco")]
    ping: bool,

    /// Ping discovery followed by discovery of the responding hosts
    #[arg(long)]
    fulldisco: bool,

    /// Load an existing service detection report and browse it without scanning
    #[arg(long, value_name = "FILE", conflicts_with_all = ["ping", "fulldisco", "file", "targets"])]
    load: Option<PathBuf>,

    /// File with one target per line
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: Option<PathBuf>,

    #[arg(long = "min-rtt", value_name = "TIME")]
    min_rtt: Option<String>,

    #[arg(long = "max-rtt-timeout", value_name = "TIME")]
    max_rtt_timeout: Option<String>,

    #[arg(long, value_name = "PATH", env = "NMAP_PATH")]
    nmap_path: Option<String>,

    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Exit after the scan instead of opening the service browser
    #[arg(long)]
    no_browse: bool,

    #[arg(value_name = "TARGET")]
    targets: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Recon pipeline");
    let config = load_config(&cli)?;

    let store = ServiceStore::open(&config.database.path).context("Failed to open service store")?;

    if let Some(report) = &cli.load {
        cmd_load(&store, report)?;
        if !cli.no_browse {
            browse(&config, &store).await?;
        }
        return Ok(());
    }

    let outcome = cmd_scan(&cli, &config, &store).await?;

    if outcome.has_findings() && !cli.no_browse {
        browse(&config, &store).await?;
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    info!("Loading configuration from: {}", cli.config.display());

    let file = if cli.config.exists() {
        Some(cli.config.as_path())
    } else {
        warn!(
            "Config file {} not found, using built-in defaults and environment",
            cli.config.display()
        );
        None
    };
    let mut config = Config::load(file)
        .map_err(report_failure)
        .context("Failed to load configuration")?;

    if let Some(nmap_path) = &cli.nmap_path {
        config.scanner.nmap_path = nmap_path.clone();
    }
    if let Some(min_rtt) = &cli.min_rtt {
        config.scanner.min_rtt_timeout = min_rtt.clone();
    }
    if let Some(max_rtt) = &cli.max_rtt_timeout {
        config.scanner.max_rtt_timeout = max_rtt.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output.base_dir = output_dir.clone();
    }
    if let Some(database) = &cli.database {
        config.database.path = database.clone();
    }

    config.validate().map_err(report_failure)?;
    Ok(config)
}

/// Operator input problems are reported before any stage starts.
fn report_failure(e: PipelineError) -> anyhow::Error {
    eprintln!("{}", format_error(&e.to_string()));
    if e.is_configuration() {
        eprintln!(
            "{}",
            format_warning("Nothing was scanned; check the config file, environment and arguments")
        );
        anyhow::Error::new(e).context("Invalid configuration")
    } else {
        anyhow::Error::new(e)
    }
}

fn cmd_load(store: &ServiceStore, report: &Path) -> Result<()> {
    info!("Loading {} into the service store", report.display());
    Validator::validate_file_path(report)
        .map_err(report_failure)
        .context("Invalid report path")?;

    let stats = store
        .load_file(report)
        .with_context(|| format!("Failed to load {}", report.display()))?;

    println!(
        "{}",
        format_success(&format!(
            "Loaded {} services ({} CPE mappings) into the database",
            stats.services_inserted, stats.cpes_inserted
        ))
    );
    Ok(())
}

async fn cmd_scan(cli: &Cli, config: &Config, store: &ServiceStore) -> Result<PipelineOutcome> {
    let mode = PipelineMode::from_flags(cli.ping, cli.fulldisco);

    println!("{}", format_step(1, 3, "Collecting targets"));
    let targets = TargetList::collect(cli.file.as_deref(), &cli.targets)
        .map_err(report_failure)
        .context("No usable targets")?;

    let started = Utc::now();
    let layout = RunLayout::create(
        &config.output.base_dir,
        &config.output.run_prefix,
        &started.with_timezone(&Local),
    )
    .context("Failed to create run directory")?;
    info!("Results will be written to {}", layout.root().display());

    debug!(
        "Stage plan for {}: {}",
        mode,
        stage_plan(mode)
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    println!(
        "{}",
        format_step(2, 3, &format!("Running {} against {} targets", mode, targets.len()))
    );
    let context = StageContext::new(&config.scanner, layout);
    let supervisor = Supervisor::new(cli.debug);

    let outcome = match PipelineOrchestrator::new(&context, &supervisor, store)
        .run(mode, &targets)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Pipeline aborted: {}", e);
            eprintln!("{}", format_error(&e.to_string()));
            let message = match e.stage() {
                Some(stage) => format!("Error during {}", stage),
                None => "Pipeline aborted".to_string(),
            };
            return Err(e).context(message);
        }
    };

    println!("{}", format_step(3, 3, "Writing run summary"));
    let summary = RunSummary::new(mode, targets.len(), &outcome, started, Utc::now());
    JsonExporter::new(context.layout().summary_file(), true)
        .export(&summary)
        .context("Failed to write run summary")?;

    report_outcome(&outcome);
    Ok(outcome)
}

fn report_outcome(outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::PingCompleted { active_ips } => {
            println!(
                "{}",
                format_success(&format!("Ping scan found {} active hosts", active_ips.len()))
            );
            for ip in active_ips {
                println!("  {}", ip);
            }
        }
        PipelineOutcome::NoActiveHosts => {
            println!("{}", format_warning("No active IP addresses found. Exiting."));
        }
        PipelineOutcome::NoOpenPorts { active_ips } => {
            println!(
                "{}",
                format_warning(&format!(
                    "No open ports found on {} active hosts. Exiting.",
                    active_ips.len()
                ))
            );
        }
        PipelineOutcome::Completed {
            active_ips,
            open_ports,
            service_report,
        } => {
            println!(
                "{}",
                format_info(&format!(
                    "{} hosts, open TCP [{}], open UDP [{}]",
                    active_ips.len(),
                    open_ports.tcp.join(","),
                    open_ports.udp.join(",")
                ))
            );
            println!(
                "{}",
                format_success(&format!(
                    "All scans completed successfully, {} loaded into the database",
                    service_report.display()
                ))
            );
        }
    }
}

async fn browse(config: &Config, store: &ServiceStore) -> Result<()> {
    let nvd = match NvdClient::new(&config.nvd) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Vulnerability lookup disabled: {}", e);
            None
        }
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut browser = Browser::new(store, stdin.lock(), stdout.lock());
    if let Some(client) = &nvd {
        browser = browser.with_nvd(client);
    }

    browser.run().await.context("Service browser failed")?;
    Ok(())
}
