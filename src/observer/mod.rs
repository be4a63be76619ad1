//! Observer subsystem: the harness side of the marker protocol.
//!
//! # Data Flow
//! ```text
//! Launch (launch.rs):
//!     direct(program) | via_shell(program) → tokio Command in its own
//!     process group, stdout piped
//!
//! FixtureProcess (process.rs):
//!     stdout lines → Transcript (transcript.rs, timestamped, parsed)
//!     signal / signal_group → SIGINT, SIGTERM, SIGKILL
//!     wait / stop → ExitOutcome (outcome.rs)
//!
//! Verification (sequence.rs):
//!     Transcript → ShutdownSequence | SequenceViolation
//! ```
//!
//! # Design Decisions
//! - Reading stdout is independent of reaping the child; after the immediate
//!   child exits the pipe is drained until every holder (grandchildren
//!   included) closes it, bounded by a timeout
//! - Stop policy: SIGTERM to the group, grace period, then SIGKILL

pub mod launch;
pub mod outcome;
pub mod process;
pub mod sequence;
pub mod transcript;

use std::io;
use std::time::Duration;

use thiserror::Error;

pub use launch::Launch;
pub use outcome::ExitOutcome;
pub use process::FixtureProcess;
pub use sequence::{SequenceViolation, ShutdownSequence, MIN_CLEANUP_GAP};
pub use transcript::{ObservedLine, Transcript};

/// Grace period given to a stopping process before SIGKILL.
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("failed to spawn {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("child stdout was not captured")]
    MissingStdout,

    #[error("child exited before its pid could be read")]
    NoPid,

    #[error("timed out after {after:?} waiting for {waiting_for}")]
    Timeout {
        waiting_for: String,
        after: Duration,
    },

    #[error("stdout closed while waiting for {0}")]
    StreamClosed(String),

    #[error("failed to send {signal} to {target}: {source}")]
    Signal {
        signal: &'static str,
        target: String,
        source: nix::errno::Errno,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
