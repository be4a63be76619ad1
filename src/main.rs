//! Graceful shutdown worker.
//!
//! A long-running process used to check that a supervisor lets its
//! (grand)children finish cleaning up after a termination request.
//!
//! # Protocol
//!
//! ```text
//!                      stdout (one flushed line per event)
//!   start ──────────▶  PROCESS_STARTED_PID=<pid>
//!     │
//!   idle (1s ticks, no output)
//!     │
//!   SIGINT | SIGTERM ▶  GRACEFUL_SHUTDOWN_START
//!     │                 GRACEFUL_SHUTDOWN_PID=<pid>
//!   cleanup (200ms)
//!     │                 GRACEFUL_SHUTDOWN_COMPLETE
//!   exit 0
//! ```
//!
//! Diagnostics go to stderr and are quiet unless `RUST_LOG` or the config
//! raises the level. Handler registration failure exits 1 with nothing on
//! stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use graceful_worker::config::{load_config, WorkerConfig};
use graceful_worker::observability::init_logging;
use graceful_worker::{MarkerWriter, Worker};

#[derive(Parser)]
#[command(name = "graceful-worker")]
#[command(about = "Worker that announces its pid and shuts down observably on SIGINT/SIGTERM", long_about = None)]
struct Cli {
    /// Optional TOML config; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(err) => {
                init_logging(&WorkerConfig::default().observability.log_level);
                tracing::error!(path = %path.display(), error = %err, "Failed to load configuration");
                return ExitCode::FAILURE;
            }
        },
        None => WorkerConfig::default(),
    };

    init_logging(&config.observability.log_level);
    tracing::debug!(
        cleanup_delay_ms = config.shutdown.cleanup_delay_ms,
        idle_tick_ms = config.idle.tick_ms,
        "Configuration loaded"
    );

    let worker = Worker::new(config);
    let mut out = MarkerWriter::stdout();

    match worker.run(&mut out).await {
        Ok(signal) => {
            tracing::info!(pid = worker.pid(), %signal, "Exiting after graceful shutdown");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(pid = worker.pid(), error = %err, "Worker failed");
            ExitCode::FAILURE
        }
    }
}
