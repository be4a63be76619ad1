//! Exit status of an observed process.

use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exited normally with this code.
    Exited(i32),
    /// Terminated by this signal number.
    Signaled(i32),
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Exited(0))
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ExitOutcome::Exited(code),
            (None, Some(signal)) => ExitOutcome::Signaled(signal),
            // Stopped/continued states are never returned by wait().
            (None, None) => ExitOutcome::Exited(status.into_raw()),
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "exit status {code}"),
            ExitOutcome::Signaled(signal) => match nix::sys::signal::Signal::try_from(*signal) {
                Ok(name) => write!(f, "killed by {}", name.as_str()),
                Err(_) => write!(f, "killed by signal {signal}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wait_status() {
        assert_eq!(ExitOutcome::from(ExitStatus::from_raw(0)), ExitOutcome::Exited(0));
        assert_eq!(ExitOutcome::from(ExitStatus::from_raw(1 << 8)), ExitOutcome::Exited(1));
        assert_eq!(ExitOutcome::from(ExitStatus::from_raw(9)), ExitOutcome::Signaled(9));
    }

    #[test]
    fn only_clean_exit_is_success() {
        assert!(ExitOutcome::Exited(0).success());
        assert!(!ExitOutcome::Exited(1).success());
        assert!(!ExitOutcome::Signaled(15).success());
    }

    #[test]
    fn display_names_signals() {
        assert_eq!(ExitOutcome::Exited(0).to_string(), "exit status 0");
        assert_eq!(ExitOutcome::Signaled(15).to_string(), "killed by SIGTERM");
        assert_eq!(ExitOutcome::Signaled(200).to_string(), "killed by signal 200");
    }
}
