//! Verification of the four-marker shutdown sequence.

use std::time::Duration;

use thiserror::Error;

use crate::observer::transcript::{ObservedLine, Transcript};
use crate::output::Marker;

/// Smallest accepted gap between the pid line and the completion line.
///
/// The worker sleeps 200ms; the margin absorbs scheduling jitter.
pub const MIN_CLEANUP_GAP: Duration = Duration::from_millis(150);

/// A verified shutdown sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownSequence {
    pub pid: u32,
    /// Observed time between `GRACEFUL_SHUTDOWN_PID` and
    /// `GRACEFUL_SHUTDOWN_COMPLETE`.
    pub cleanup: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceViolation {
    #[error("no marker lines were observed")]
    NoMarkers,

    #[error("first marker was {0}, expected PROCESS_STARTED_PID")]
    StartupNotFirst(Marker),

    #[error("first line was {0:?}, expected PROCESS_STARTED_PID")]
    StartupNotFirstLine(String),

    #[error("{0} was never observed")]
    Missing(&'static str),

    #[error("expected {expected}, found {found}")]
    OutOfOrder { expected: &'static str, found: Marker },

    #[error("GRACEFUL_SHUTDOWN_PID={found} does not match startup pid {expected}")]
    PidMismatch { expected: u32, found: u32 },

    #[error("cleanup took {actual:?}, expected at least {minimum:?}")]
    CleanupTooShort { actual: Duration, minimum: Duration },

    #[error("unexpected marker after GRACEFUL_SHUTDOWN_COMPLETE: {0}")]
    Trailing(Marker),
}

impl ShutdownSequence {
    /// Check that the transcript opens with the startup line and that its
    /// markers are exactly startup, start, pid, complete, with matching pids
    /// and at least `min_cleanup` between the last two. Non-marker lines
    /// after the startup line are ignored.
    pub fn verify(
        transcript: &Transcript,
        min_cleanup: Duration,
    ) -> Result<Self, SequenceViolation> {
        if let Some(first) = transcript.lines().first() {
            if first.marker.is_none() && transcript.markers().next().is_some() {
                return Err(SequenceViolation::StartupNotFirstLine(first.text.clone()));
            }
        }

        let mut markers = transcript.markers();

        let pid = match markers.next() {
            None => return Err(SequenceViolation::NoMarkers),
            Some((_, Marker::ProcessStarted { pid })) => pid,
            Some((_, other)) => return Err(SequenceViolation::StartupNotFirst(other)),
        };

        expect(markers.next(), "GRACEFUL_SHUTDOWN_START", |m| {
            matches!(m, Marker::ShutdownStart)
        })?;

        let (pid_line, pid_marker) = expect(markers.next(), "GRACEFUL_SHUTDOWN_PID", |m| {
            matches!(m, Marker::ShutdownPid { .. })
        })?;
        if let Marker::ShutdownPid { pid: found } = pid_marker {
            if found != pid {
                return Err(SequenceViolation::PidMismatch {
                    expected: pid,
                    found,
                });
            }
        }

        let (complete_line, _) = expect(markers.next(), "GRACEFUL_SHUTDOWN_COMPLETE", |m| {
            matches!(m, Marker::ShutdownComplete)
        })?;

        let cleanup = complete_line.at.saturating_duration_since(pid_line.at);
        if cleanup < min_cleanup {
            return Err(SequenceViolation::CleanupTooShort {
                actual: cleanup,
                minimum: min_cleanup,
            });
        }

        if let Some((_, extra)) = markers.next() {
            return Err(SequenceViolation::Trailing(extra));
        }

        Ok(Self { pid, cleanup })
    }
}

fn expect<'a>(
    next: Option<(&'a ObservedLine, Marker)>,
    expected: &'static str,
    is_expected: impl Fn(&Marker) -> bool,
) -> Result<(&'a ObservedLine, Marker), SequenceViolation> {
    match next {
        None => Err(SequenceViolation::Missing(expected)),
        Some((line, marker)) if is_expected(&marker) => Ok((line, marker)),
        Some((_, found)) => Err(SequenceViolation::OutOfOrder { expected, found }),
    }
}
