//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Register SIGINT/SIGTERM → PROCESS_STARTED_PID=<pid> → idle loop
//!
//! Signals (signals.rs):
//!     SIGINT or SIGTERM → ShutdownSignal (identical handling)
//!
//! Shutdown (shutdown.rs):
//!     GRACEFUL_SHUTDOWN_START → GRACEFUL_SHUTDOWN_PID=<pid>
//!         → cleanup delay → GRACEFUL_SHUTDOWN_COMPLETE → exit 0
//! ```
//!
//! # Design Decisions
//! - Handlers are installed before the startup marker, so an observer may
//!   signal as soon as it reads the pid
//! - Fail fast: a handler that cannot be registered aborts the worker
//!   before any marker is written
//! - Single-threaded: the idle loop and the shutdown path never write
//!   concurrently

pub mod shutdown;
pub mod signals;
pub mod startup;

use std::future::Future;
use std::io::{self, Write};

use thiserror::Error;

use crate::config::WorkerConfig;
use crate::output::MarkerWriter;

pub use shutdown::GracefulShutdown;
pub use signals::{ParseSignalError, ShutdownSignal, SignalListener};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to register {signal} handler: {source}")]
    SignalRegistration {
        signal: ShutdownSignal,
        source: io::Error,
    },

    #[error("failed to write marker: {0}")]
    Output(#[from] io::Error),
}

/// The signal-responsive worker.
pub struct Worker {
    config: WorkerConfig,
    pid: u32,
}

impl Worker {
    /// Worker announcing the current process's pid.
    pub fn new(config: WorkerConfig) -> Self {
        Self::with_pid(config, std::process::id())
    }

    pub fn with_pid(config: WorkerConfig, pid: u32) -> Self {
        Self { config, pid }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Install signal handlers and run until SIGINT or SIGTERM has been
    /// handled. Returns the signal that ended the run.
    pub async fn run<W: Write>(
        &self,
        out: &mut MarkerWriter<W>,
    ) -> Result<ShutdownSignal, LifecycleError> {
        let mut listener = SignalListener::register()?;
        self.run_until(out, listener.recv()).await
    }

    /// Announce, idle until `shutdown` resolves, then run the graceful
    /// shutdown sequence.
    pub async fn run_until<W, F>(
        &self,
        out: &mut MarkerWriter<W>,
        shutdown: F,
    ) -> Result<ShutdownSignal, LifecycleError>
    where
        W: Write,
        F: Future<Output = ShutdownSignal>,
    {
        startup::announce(out, self.pid)?;

        let signal = startup::idle(self.config.idle.tick(), shutdown).await;

        GracefulShutdown::new(self.pid, self.config.shutdown.cleanup_delay())
            .run(out, signal)
            .await?;

        Ok(signal)
    }
}
