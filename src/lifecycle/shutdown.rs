//! Graceful shutdown sequence.

use std::io::{self, Write};
use std::time::Duration;

use tokio::time;

use crate::lifecycle::ShutdownSignal;
use crate::output::{Marker, MarkerWriter};

/// The observable cleanup phase run after a shutdown signal.
///
/// Emits `GRACEFUL_SHUTDOWN_START` and `GRACEFUL_SHUTDOWN_PID=<pid>`, waits
/// `cleanup_delay`, then emits `GRACEFUL_SHUTDOWN_COMPLETE`. The delay is
/// not raced against anything; it always elapses in full.
#[derive(Debug, Clone)]
pub struct GracefulShutdown {
    pid: u32,
    cleanup_delay: Duration,
}

impl GracefulShutdown {
    pub fn new(pid: u32, cleanup_delay: Duration) -> Self {
        Self { pid, cleanup_delay }
    }

    pub async fn run<W: Write>(
        &self,
        out: &mut MarkerWriter<W>,
        signal: ShutdownSignal,
    ) -> io::Result<()> {
        tracing::info!(
            pid = self.pid,
            %signal,
            cleanup_delay_ms = self.cleanup_delay.as_millis() as u64,
            "Graceful shutdown starting"
        );

        out.emit(Marker::ShutdownStart)?;
        out.emit(Marker::ShutdownPid { pid: self.pid })?;

        time::sleep(self.cleanup_delay).await;

        out.emit(Marker::ShutdownComplete)?;
        tracing::info!(pid = self.pid, "Graceful shutdown complete");
        Ok(())
    }
}
