//! Startup announcement and idle loop.
//!
//! # Responsibilities
//! - Announce the worker's pid once handlers are installed
//! - Idle without producing output until a shutdown signal arrives

use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::lifecycle::ShutdownSignal;
use crate::output::{Marker, MarkerWriter};

/// Emit `PROCESS_STARTED_PID=<pid>`.
pub fn announce<W: Write>(out: &mut MarkerWriter<W>, pid: u32) -> io::Result<()> {
    out.emit(Marker::ProcessStarted { pid })?;
    tracing::info!(pid, "Worker started");
    Ok(())
}

/// Tick every `tick` until `shutdown` resolves, then return its signal.
pub async fn idle<F>(tick: Duration, shutdown: F) -> ShutdownSignal
where
    F: Future<Output = ShutdownSignal>,
{
    let mut ticker = time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            signal = &mut shutdown => {
                tracing::debug!(ticks, "Idle loop finished");
                return signal;
            }
            _ = ticker.tick() => {
                ticks += 1;
                tracing::trace!(ticks, "Idle");
            }
        }
    }
}
