// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! ECAM Sim - headless runner
//!
//! Runs the simulation on real timers and logs alarm and master-status
//! events until Ctrl+C or the requested duration elapses.

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter};

use ecam::alarms::TestMode;
use ecam::core::{Event, EventPayload, Simulation, SimulationClock};
use ecam::{Config, FaultSelection, VERSION};

/// ECAM Sim - aircraft systems monitoring simulator
#[derive(Parser, Debug)]
#[command(name = "ecam-sim")]
#[command(author = "bad-antics")]
#[command(version = VERSION)]
#[command(about = "Simulated ECAM telemetry, alarms and master status")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Fixed RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Use weighted fault selection
    #[arg(long)]
    weighted: bool,

    /// Force every alarm check to raise a fault
    #[arg(long)]
    test_mode: bool,

    /// Fault codes to raise in order (implies --test-mode)
    #[arg(long, value_delimiter = ',')]
    script: Vec<String>,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<u64>,

    /// Print a JSON summary on exit
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging before anything can fail, so config errors are reported
    let initial = if args.trace {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        "info"
    };
    let (filter, filter_handle) = reload::Layer::new(EnvFilter::new(initial));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .with_ansi(true),
        )
        .try_init()?;

    info!("ECAM Sim v{}", VERSION);

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)
        .with_context(|| format!("refusing to start with configuration {:?}", config_path))
        .map_err(|e| {
            error!("{:#}", e);
            e
        })?;
    info!("Configuration loaded from {:?}", config_path);

    // The configured level applies unless overridden on the command line
    if !args.trace && !args.debug {
        match EnvFilter::try_new(&config.log_level) {
            Ok(level) => {
                if let Err(e) = filter_handle.reload(level) {
                    warn!("Failed to apply log level {:?}: {}", config.log_level, e);
                }
            }
            Err(e) => warn!("Invalid log level {:?} in configuration, keeping info: {}", config.log_level, e),
        }
    }

    // Override with command line args
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
    if args.weighted {
        config.simulation.fault_selection = FaultSelection::Weighted;
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_headless(config, args))
}

async fn run_headless(config: Config, args: Args) -> Result<()> {
    let clock = SimulationClock::from_config(&config.simulation);
    let mut simulation = Simulation::new(config)?;

    if !args.script.is_empty() {
        simulation.set_test_mode(Some(TestMode::with_codes(args.script.clone())));
    } else if args.test_mode {
        simulation.set_test_mode(Some(TestMode::forced()));
    }

    let events = simulation.event_bus().subscribe_events();
    let simulation = Arc::new(Mutex::new(simulation));
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let logger = tokio::spawn(log_events(events));

    info!("Running headless, press Ctrl+C to stop");

    let stop = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
            }
        }
    };

    clock.start();
    let runner = clock.run(Arc::clone(&simulation), shutdown_rx);
    tokio::pin!(runner);

    tokio::select! {
        _ = &mut runner => {}
        _ = stop => {
            info!("Shutdown requested, stopping clock...");
            let _ = shutdown_tx.send(());
            runner.await;
        }
    }
    logger.abort();

    let simulation = simulation.lock();
    let master = simulation.master_state();
    info!(
        "Final master status {} ({} warnings, {} cautions, {} alarms logged)",
        master.status,
        master.warn_count,
        master.caut_count,
        simulation.alarm_log().len()
    );

    if args.summary {
        println!("{}", serde_json::to_string_pretty(&simulation.summary())?);
    }

    Ok(())
}

/// Stand-in for display and audio collaborators
async fn log_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => match event.payload {
                EventPayload::Alarm(alarm) => {
                    info!(id = alarm.id, level = %alarm.level, acknowledged = alarm.acknowledged, "{}", alarm.message)
                }
                EventPayload::Status { previous, current } => {
                    info!("MASTER {} -> {}", previous.status, current.status)
                }
                EventPayload::Readings(_) => {}
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Event logger lagged, {} events skipped", skipped)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
