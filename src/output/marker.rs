//! Marker line vocabulary.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const PROCESS_STARTED_PID: &str = "PROCESS_STARTED_PID=";
const SHUTDOWN_START: &str = "GRACEFUL_SHUTDOWN_START";
const SHUTDOWN_PID: &str = "GRACEFUL_SHUTDOWN_PID=";
const SHUTDOWN_COMPLETE: &str = "GRACEFUL_SHUTDOWN_COMPLETE";

/// A lifecycle transition announced on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `PROCESS_STARTED_PID=<pid>`, once at startup.
    ProcessStarted { pid: u32 },
    /// `GRACEFUL_SHUTDOWN_START`, first line after a shutdown signal.
    ShutdownStart,
    /// `GRACEFUL_SHUTDOWN_PID=<pid>`, same pid as the startup line.
    ShutdownPid { pid: u32 },
    /// `GRACEFUL_SHUTDOWN_COMPLETE`, after the cleanup delay.
    ShutdownComplete,
}

impl Marker {
    /// The pid carried by this marker, if any.
    pub fn pid(&self) -> Option<u32> {
        match self {
            Marker::ProcessStarted { pid } | Marker::ShutdownPid { pid } => Some(*pid),
            Marker::ShutdownStart | Marker::ShutdownComplete => None,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::ProcessStarted { pid } => write!(f, "{PROCESS_STARTED_PID}{pid}"),
            Marker::ShutdownStart => f.write_str(SHUTDOWN_START),
            Marker::ShutdownPid { pid } => write!(f, "{SHUTDOWN_PID}{pid}"),
            Marker::ShutdownComplete => f.write_str(SHUTDOWN_COMPLETE),
        }
    }
}

/// A line that is not part of the marker vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerParseError {
    #[error("not a marker line: {0:?}")]
    Unknown(String),

    #[error("invalid pid {value:?} in {line:?}")]
    InvalidPid { line: String, value: String },
}

impl FromStr for Marker {
    type Err = MarkerParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line == SHUTDOWN_START {
            return Ok(Marker::ShutdownStart);
        }
        if line == SHUTDOWN_COMPLETE {
            return Ok(Marker::ShutdownComplete);
        }
        if let Some(value) = line.strip_prefix(PROCESS_STARTED_PID) {
            return parse_pid(line, value).map(|pid| Marker::ProcessStarted { pid });
        }
        if let Some(value) = line.strip_prefix(SHUTDOWN_PID) {
            return parse_pid(line, value).map(|pid| Marker::ShutdownPid { pid });
        }

        Err(MarkerParseError::Unknown(line.to_string()))
    }
}

fn parse_pid(line: &str, value: &str) -> Result<u32, MarkerParseError> {
    // u32::from_str accepts a leading '+', the vocabulary does not.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MarkerParseError::InvalidPid {
            line: line.to_string(),
            value: value.to_string(),
        });
    }
    value.parse().map_err(|_| MarkerParseError::InvalidPid {
        line: line.to_string(),
        value: value.to_string(),
    })
}
