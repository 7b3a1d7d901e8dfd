//! resinprint: command-line print host.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  SimBoard      LogEventSink   JsonConfigFile   HostClock   │
//! │  (DigitalIo)   (EventSink)    (ConfigPort)     (Clock)     │
//! │  LogProjector  StdDelay       operator thread (stdin)      │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ───────────────      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │            PrintService (pure logic)                 │  │
//! │  │  FSM · Motion · Exposure                             │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::fs::File;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use resinprint::adapters::config_file::JsonConfigFile;
use resinprint::adapters::log_sink::LogEventSink;
use resinprint::adapters::projector::LogProjector;
use resinprint::adapters::sim_board::SimBoard;
use resinprint::adapters::time::{HostClock, StdDelay};
use resinprint::app::channels::COMMAND_CHANNEL;
use resinprint::app::commands::AppCommand;
use resinprint::app::events::JobOutcome;
use resinprint::app::ports::ConfigPort;
use resinprint::app::service::PrintService;
use resinprint::config::PrinterConfig;
use resinprint::layers::LayerSequence;
use resinprint::motion::StopToken;

/// Stepper resin printer host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Printer config file (JSON); defaults are used when it does not exist
    #[arg(short, long, default_value = "resinprint.json")]
    config: PathBuf,

    /// Folder of numbered layer images (1.png, 2.png, ...)
    #[arg(short, long)]
    slices: Option<PathBuf>,

    /// Board endpoint, overrides the config file
    #[arg(short, long)]
    port: Option<String>,

    /// enable debug messages
    #[arg(short, long)]
    verbose: bool,

    /// write log to file instead of stderr
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// Write the default config to --config and exit
    #[arg(long)]
    write_default_config: bool,

    /// Travel between the simulated limit switches (mm)
    #[arg(long, default_value_t = 120.0)]
    sim_travel_mm: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    info!("resinprint v{}", env!("CARGO_PKG_VERSION"));

    let store = JsonConfigFile::new(&args.config);
    if args.write_default_config {
        store
            .save(&PrinterConfig::default())
            .with_context(|| format!("writing {}", store.path().display()))?;
        info!("Default config written to {}", store.path().display());
        return Ok(());
    }

    let mut config = store
        .load()
        .with_context(|| format!("loading {}", store.path().display()))?;
    if let Some(port) = args.port.clone() {
        config.connection.endpoint = port;
    }

    let Some(slices) = args.slices.as_deref() else {
        bail!("--slices <DIR> is required to print");
    };
    let layers = LayerSequence::from_dir(slices)
        .with_context(|| format!("scanning {}", slices.display()))?;

    let board = open_board(&config, args.sim_travel_mm)?;
    let clock = HostClock::new();
    let mut sink = LogEventSink::new();
    let mut projector = LogProjector::new();
    let mut service = PrintService::from_config(StdDelay, &config);

    service
        .connect(board, config.axis, &mut sink)
        .context("connecting to board")?;
    spawn_operator(service.stop_token(), service.cancel_token())?;
    service
        .start(layers, config.plan, &clock, &mut sink)
        .context("starting print")?;

    info!("Commands: cancel | estop | reset | status");
    let interval = Duration::from_millis(u64::from(config.control_loop_interval_ms));

    let outcome = 'run: loop {
        while let Ok(cmd) = COMMAND_CHANNEL.try_receive() {
            match service.handle_command(cmd, &clock, &mut sink) {
                Ok(Some(outcome)) => break 'run outcome,
                Ok(None) => {}
                Err(e) => warn!("Command rejected: {}", e),
            }
        }
        if let Some(outcome) = service.tick(&clock, &mut projector, &mut sink) {
            break outcome;
        }
        thread::sleep(interval);
    };

    if let Some(board) = service.disconnect(&mut sink) {
        info!("Platform parked at {:.2} mm", board.position_mm());
    }

    match outcome {
        JobOutcome::Completed { .. } | JobOutcome::Cancelled { .. } => Ok(()),
        JobOutcome::Failed { layer, error } => {
            bail!("print failed at layer {}: {}", layer + 1, error)
        }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter(None, log::LevelFilter::Debug);
    } else {
        builder.filter(None, log::LevelFilter::Info);
    }
    if let Some(ref path) = args.log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Only the built-in simulator is available; a real board needs a
/// Firmata-style transport implementing `DigitalIo`.
fn open_board(config: &PrinterConfig, travel_mm: f64) -> Result<SimBoard> {
    let endpoint = config.connection.endpoint.as_str();
    if endpoint != "sim" {
        bail!("endpoint '{}' is not supported; use 'sim'", endpoint);
    }
    info!(
        "Simulated board #{} with {:.0} mm travel",
        config.connection.instance_id, travel_mm
    );
    Ok(SimBoard::new(config.axis, travel_mm, travel_mm / 2.0))
}

/// Read operator commands from stdin and post them to the control loop.
/// Cancel and emergency stop also trip their shared tokens so a pulse
/// train in flight aborts without waiting for the queue.
fn spawn_operator(stop: StopToken, cancel: StopToken) -> Result<()> {
    thread::Builder::new()
        .name("operator".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let cmd = match line.trim() {
                    "" => continue,
                    "cancel" | "c" => {
                        cancel.trip();
                        AppCommand::Cancel
                    }
                    "estop" | "e" => {
                        stop.trip();
                        AppCommand::EmergencyStop
                    }
                    "reset" | "r" => AppCommand::ResetEmergencyStop,
                    "status" | "s" => AppCommand::ReportStatus,
                    other => {
                        warn!("Unknown command '{}' (cancel, estop, reset, status)", other);
                        continue;
                    }
                };
                if COMMAND_CHANNEL.try_send(cmd).is_err() {
                    warn!("Command queue full, dropped");
                }
            }
        })
        .context("spawning operator thread")?;
    Ok(())
}
