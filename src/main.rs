//! HARBOR - Port Equipment Fleet Monitor
//!
//! Runs the fleet simulation, reports health escalations and custom alert
//! rule triggers as they happen, and prints a fleet summary on exit.
//!
//! ## Usage
//!
//! ```bash
//! # Run until Ctrl-C with ~/.harbor/config.yaml (or defaults)
//! harbor
//!
//! # Reproducible run: fixed seed, fast ticks, stop after 30 ticks
//! harbor --seed 42 --interval-ms 100 --ticks 30
//!
//! # Dump the final fleet snapshot as JSON
//! harbor --ticks 10 --json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use harbor_config::HarborConfig;
use harbor_core::{HarborError, LogGuard, init_logging};
use harbor_sim::{FleetMonitor, TickReport, TickScheduler};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

/// HARBOR port equipment fleet monitor
#[derive(Parser, Debug)]
#[command(name = "harbor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.harbor/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Configuration file (defaults to ~/.harbor/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the simulation's random source
    #[arg(long)]
    seed: Option<u64>,

    /// Tick interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after this many ticks instead of waiting for Ctrl-C
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    ticks: Option<u64>,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    info!("Starting HARBOR monitor");

    match run(&cli).await {
        Ok(()) => {
            info!("HARBOR monitor exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("HARBOR monitor error: {:#}", e);
            eprintln!("Error: {:#}", e);
            if let Some(hint) = e.downcast_ref::<HarborError>().and_then(HarborError::guidance) {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> harbor_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

/// Load configuration and apply command line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<HarborConfig> {
    let mut config = match &cli.config {
        Some(path) => HarborConfig::from_yaml(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => HarborConfig::load().context("failed to load configuration")?,
    };

    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.simulation.tick_interval_ms = interval_ms;
    }
    config.validate().context("invalid command line overrides")?;
    Ok(config)
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let scheduler = TickScheduler::from_config(&config.simulation);
    let monitor = FleetMonitor::new(config).context("failed to start fleet monitor")?;

    if !cli.json {
        println!("{}", monitor.summary().format_compact());
        for rule in monitor.alert_rules() {
            println!("rule {}: {}", rule.id, rule.description());
        }
    }

    let handle = scheduler.start(monitor);
    let mut reports = handle.reports();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            received = reports.recv() => match received {
                Ok(report) => {
                    if !cli.json {
                        print_report(&report);
                    }
                    if cli.ticks.is_some_and(|limit| report.tick >= limit) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "tick reports lagged behind");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => {
                info!("Interrupt received, stopping");
                break;
            }
        }
    }

    let snapshot = handle.shutdown().await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        println!("{}", snapshot.summary.format_compact());
    }
    Ok(())
}

fn print_report(report: &TickReport) {
    for item in &report.notifications {
        println!(
            "[tick {:>4}] {:<7} {}",
            report.tick,
            item.severity.to_string(),
            item.message
        );
    }
}
