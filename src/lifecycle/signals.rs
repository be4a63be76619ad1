//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT and SIGTERM
//! - Translate either signal into a single shutdown request
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (self-pipe, async-safe)
//! - Both signals lead to the same shutdown path
//! - Handlers stay installed for the life of the process, so a second
//!   signal during cleanup is absorbed rather than killing the worker

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tokio::signal::unix::{signal, Signal, SignalKind};

use crate::lifecycle::LifecycleError;

/// A termination request the worker responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownSignal {
    /// SIGINT
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl ShutdownSignal {
    pub const ALL: [ShutdownSignal; 2] = [ShutdownSignal::Interrupt, ShutdownSignal::Terminate];

    pub fn kind(self) -> SignalKind {
        match self {
            ShutdownSignal::Interrupt => SignalKind::interrupt(),
            ShutdownSignal::Terminate => SignalKind::terminate(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ShutdownSignal> for nix::sys::signal::Signal {
    fn from(signal: ShutdownSignal) -> Self {
        match signal {
            ShutdownSignal::Interrupt => Self::SIGINT,
            ShutdownSignal::Terminate => Self::SIGTERM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shutdown signal {0:?} (expected int or term)")]
pub struct ParseSignalError(String);

impl FromStr for ShutdownSignal {
    type Err = ParseSignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let name = lower.strip_prefix("sig").unwrap_or(&lower);
        match name {
            "int" | "interrupt" => Ok(ShutdownSignal::Interrupt),
            "term" | "terminate" => Ok(ShutdownSignal::Terminate),
            _ => Err(ParseSignalError(s.to_string())),
        }
    }
}

/// Installed SIGINT and SIGTERM handlers.
///
/// Must be created inside a Tokio runtime.
pub struct SignalListener {
    interrupt: Signal,
    terminate: Signal,
}

impl SignalListener {
    /// Install both handlers, failing on the first that cannot be registered.
    pub fn register() -> Result<Self, LifecycleError> {
        let interrupt = listen(ShutdownSignal::Interrupt)?;
        let terminate = listen(ShutdownSignal::Terminate)?;

        tracing::debug!("Signal handlers registered for SIGINT and SIGTERM");
        Ok(Self {
            interrupt,
            terminate,
        })
    }

    /// Wait for the next SIGINT or SIGTERM.
    pub async fn recv(&mut self) -> ShutdownSignal {
        let signal = tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
        };
        tracing::info!(%signal, "Shutdown signal received");
        signal
    }
}

fn listen(shutdown: ShutdownSignal) -> Result<Signal, LifecycleError> {
    signal(shutdown.kind()).map_err(|source| LifecycleError::SignalRegistration {
        signal: shutdown,
        source,
    })
}
