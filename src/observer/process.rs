//! A spawned, observed process.

use std::io;
use std::os::unix::process::CommandExt;
use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::lifecycle::ShutdownSignal;
use crate::observer::{ExitOutcome, Launch, ObservedLine, ObserverError, Transcript};
use crate::output::Marker;

/// How long to wait for the process after SIGKILL.
const KILL_WAIT: Duration = Duration::from_secs(1);

/// A child process whose stdout is captured line by line.
///
/// The child leads its own process group, so [`signal_group`] reaches
/// anything it spawned (a shell's children, for instance).
///
/// A background task reads stdout and stamps each line when it arrives, so
/// timings stay accurate however late the caller gets around to reading.
///
/// [`signal_group`]: FixtureProcess::signal_group
pub struct FixtureProcess {
    child: Child,
    pid: u32,
    lines: mpsc::UnboundedReceiver<io::Result<ObservedLine>>,
    transcript: Transcript,
    exited: Option<ExitOutcome>,
    eof: bool,
}

impl FixtureProcess {
    /// Spawn `launch` with piped stdout in a new process group.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn spawn(launch: &Launch) -> Result<Self, ObserverError> {
        let mut command = launch.command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .process_group(0);
        let mut command = Command::from(command);
        command.kill_on_drop(true);

        let started = std::time::Instant::now();
        let mut child = command.spawn().map_err(|source| ObserverError::Spawn {
            program: launch.program().display().to_string(),
            source,
        })?;
        let pid = child.id().ok_or(ObserverError::NoPid)?;
        let stdout = child.stdout.take().ok_or(ObserverError::MissingStdout)?;

        tracing::debug!(pid, program = %launch.program().display(), ?launch, "Spawned observed process");

        Ok(Self {
            child,
            pid,
            lines: spawn_reader(stdout, pid),
            transcript: Transcript::new(started),
            exited: None,
            eof: false,
        })
    }

    /// Pid of the immediate child (the shell, for [`Launch::via_shell`]).
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Read the next stdout line, `None` once every writer has closed the pipe.
    pub async fn next_line(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<ObservedLine>, ObserverError> {
        if self.eof {
            return Ok(None);
        }

        // `recv` is cancel safe, so a timeout loses no data.
        let received = time::timeout(timeout, self.lines.recv())
            .await
            .map_err(|_| ObserverError::Timeout {
                waiting_for: "next output line".to_string(),
                after: timeout,
            })?;

        match received {
            Some(read) => {
                let line = read?;
                self.transcript.push(line.clone());
                Ok(Some(line))
            }
            None => {
                self.eof = true;
                Ok(None)
            }
        }
    }

    /// Read until a marker satisfying `is_wanted` arrives.
    pub async fn expect_marker(
        &mut self,
        description: &str,
        timeout: Duration,
        is_wanted: impl Fn(&Marker) -> bool,
    ) -> Result<ObservedLine, ObserverError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.next_line(remaining).await {
                Ok(Some(line)) => {
                    if line.marker.as_ref().is_some_and(&is_wanted) {
                        return Ok(line);
                    }
                }
                Ok(None) => return Err(ObserverError::StreamClosed(description.to_string())),
                Err(ObserverError::Timeout { .. }) => {
                    return Err(ObserverError::Timeout {
                        waiting_for: description.to_string(),
                        after: timeout,
                    })
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Wait for `PROCESS_STARTED_PID=<pid>` and return the announced pid.
    pub async fn wait_for_startup(&mut self, timeout: Duration) -> Result<u32, ObserverError> {
        let line = self
            .expect_marker("PROCESS_STARTED_PID", timeout, |m| {
                matches!(m, Marker::ProcessStarted { .. })
            })
            .await?;
        match line.marker {
            Some(Marker::ProcessStarted { pid }) => Ok(pid),
            _ => Err(ObserverError::StreamClosed("PROCESS_STARTED_PID".to_string())),
        }
    }

    /// Send `signal` to the immediate child only.
    pub fn signal(&self, signal: ShutdownSignal) -> Result<(), ObserverError> {
        self.send(signal.into(), false)
    }

    /// Send `signal` to every process in the child's group.
    pub fn signal_group(&self, signal: ShutdownSignal) -> Result<(), ObserverError> {
        self.send(signal.into(), true)
    }

    fn send(&self, signal: Signal, group: bool) -> Result<(), ObserverError> {
        let target = Pid::from_raw(self.pid as i32);
        let result = if group {
            killpg(target, signal)
        } else {
            kill(target, signal)
        };

        tracing::debug!(pid = self.pid, group, signal = signal.as_str(), "Sending signal");
        result.map_err(|source| ObserverError::Signal {
            signal: signal.as_str(),
            target: if group {
                format!("process group {}", self.pid)
            } else {
                format!("pid {}", self.pid)
            },
            source,
        })
    }

    /// Reap the immediate child, or fail after `timeout`.
    pub async fn wait(&mut self, timeout: Duration) -> Result<ExitOutcome, ObserverError> {
        if let Some(outcome) = self.exited {
            return Ok(outcome);
        }

        let status = time::timeout(timeout, self.child.wait())
            .await
            .map_err(|_| ObserverError::Timeout {
                waiting_for: format!("pid {} to exit", self.pid),
                after: timeout,
            })??;

        let outcome = ExitOutcome::from(status);
        tracing::debug!(pid = self.pid, %outcome, "Observed process exited");
        self.exited = Some(outcome);
        Ok(outcome)
    }

    /// Non-blocking check for exit.
    pub fn try_wait(&mut self) -> Result<Option<ExitOutcome>, ObserverError> {
        if self.exited.is_none() {
            self.exited = self.child.try_wait()?.map(ExitOutcome::from);
        }
        Ok(self.exited)
    }

    /// SIGTERM the group, allow `grace` for a clean exit, then SIGKILL.
    pub async fn stop(&mut self, grace: Duration) -> Result<ExitOutcome, ObserverError> {
        if let Err(err) = self.signal_group(ShutdownSignal::Terminate) {
            // Most likely already gone; wait() below settles it.
            tracing::warn!(pid = self.pid, error = %err, "SIGTERM failed (process may have already exited)");
        }

        match self.wait(grace).await {
            Ok(outcome) => Ok(outcome),
            Err(ObserverError::Timeout { .. }) => {
                tracing::warn!(
                    pid = self.pid,
                    grace_ms = grace.as_millis() as u64,
                    "Sending SIGKILL (graceful shutdown timed out)"
                );
                if let Err(err) = self.send(Signal::SIGKILL, true) {
                    tracing::warn!(pid = self.pid, error = %err, "SIGKILL failed");
                }
                self.wait(KILL_WAIT).await
            }
            Err(err) => Err(err),
        }
    }

    /// Read remaining output until every writer closes stdout.
    ///
    /// Returns `false` if `timeout` elapsed first; lines read before that
    /// are kept in the transcript.
    pub async fn drain(&mut self, timeout: Duration) -> Result<bool, ObserverError> {
        let deadline = Instant::now() + timeout;
        while !self.eof {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.next_line(remaining).await {
                Ok(_) => {}
                Err(ObserverError::Timeout { .. }) => {
                    tracing::warn!(pid = self.pid, "Output capture timed out (some lines may be missing)");
                    return Ok(false);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(true)
    }
}

/// Forward stdout lines, stamped on arrival, until end of file.
///
/// Bytes that are not valid UTF-8 are replaced, so such lines are kept as
/// plain (non-marker) output instead of ending the capture.
fn spawn_reader(
    stdout: ChildStdout,
    pid: u32,
) -> mpsc::UnboundedReceiver<io::Result<ObservedLine>> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let at = std::time::Instant::now();
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }
                    let line = ObservedLine::new(String::from_utf8_lossy(&buf).into_owned(), at);
                    tracing::trace!(pid, text = %line.text, "Observed line");
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            }
        }
    });

    rx
}

impl Drop for FixtureProcess {
    fn drop(&mut self) {
        // kill_on_drop only reaches the immediate child; a grandchild still
        // holding stdout would outlive the observer.
        if self.exited.is_none() || !self.eof {
            let _ = killpg(Pid::from_raw(self.pid as i32), Signal::SIGKILL);
        }
    }
}
