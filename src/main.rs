//! midithru: forward MIDI events from selected inputs to selected outputs,
//! with a live terminal event log.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use midithru_io::config::{self, PortConfig};
use midithru_io::{event_channel, OpenSummary, PassThroughEngine, PortRegistry};

mod tui;

#[derive(Parser, Debug)]
#[command(name = "midithru", version, about = "MIDI pass-through with a live event log")]
struct Cli {
    /// Path to the port-selection config (default: midithru.toml next to
    /// the executable).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print available MIDI ports and exit.
    #[arg(long)]
    list_ports: bool,
}

fn init_tracing(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn list_ports(registry: &PortRegistry) -> Result<(), Box<dyn std::error::Error>> {
    println!("Inputs:");
    for name in registry.list_inputs()? {
        println!("  {name}");
    }
    println!("Outputs:");
    for name in registry.list_outputs()? {
        println!("  {name}");
    }
    Ok(())
}

/// SIGINT or SIGTERM sets the flag; the TUI loop sees it and exits, so
/// the ordered teardown below still runs on a `kill`.
fn register_shutdown_flag() -> std::io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&flag))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&flag))?;
    Ok(flag)
}

/// One status line summarizing a batch open, or nothing when all went well.
fn open_status(kind: &str, summary: &OpenSummary) -> Option<String> {
    if summary.all_ok() {
        return None;
    }
    let failed: Vec<String> = summary
        .failed
        .iter()
        .map(|(name, e)| format!("{name} ({e})"))
        .collect();
    Some(format!("failed to open {kind}: {}", failed.join(", ")))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let registry = Arc::new(PortRegistry::new());
    if cli.list_ports {
        return list_ports(&registry);
    }

    let config_path = cli.config.unwrap_or_else(config::default_path);
    let mut port_config = PortConfig::load(&config_path);

    // Partial failures land in the status line, not in an early exit; a
    // stale config must not keep the tool from starting.
    let mut status: Vec<String> = Vec::new();
    status.extend(open_status("inputs", &registry.open_inputs(&port_config.inputs)));
    status.extend(open_status("outputs", &registry.open_outputs(&port_config.outputs)));
    let status = if status.is_empty() {
        None
    } else {
        Some(status.join("; "))
    };

    let shutdown = register_shutdown_flag()?;

    let (events_tx, events_rx) = event_channel();
    let engine = PassThroughEngine::new(Arc::clone(&registry), Some(events_tx));
    engine.start();

    let tui_result = tui::run(
        &registry,
        &events_rx,
        &mut port_config,
        &config_path,
        status,
        &shutdown,
    );

    // Best-effort teardown, in order: no more forwarding, then no more
    // device handles, then the selection on disk.
    engine.stop();
    registry.close();
    if let Err(e) = port_config.save(&config_path) {
        warn!(path = %config_path.display(), error = %e, "failed to save config on exit");
    }

    tui_result
}
