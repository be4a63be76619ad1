//! Shared utilities for process-level tests.

use std::path::PathBuf;
use std::time::Duration;

use graceful_worker::observer::{FixtureProcess, Launch};

#[allow(dead_code)]
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Path of the worker binary built for this test run.
pub fn worker_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_graceful-worker"))
}

/// Spawn `launch` and wait for its startup marker.
#[allow(dead_code)]
pub async fn start(launch: Launch) -> (FixtureProcess, u32) {
    let mut process = FixtureProcess::spawn(&launch).expect("spawn worker");
    let pid = process
        .wait_for_startup(STARTUP_TIMEOUT)
        .await
        .expect("startup marker");
    (process, pid)
}

/// Markers with pids blanked, for comparing runs of different processes.
#[allow(dead_code)]
pub fn normalized_markers(process: &FixtureProcess) -> Vec<String> {
    process
        .transcript()
        .markers()
        .map(|(_, marker)| match marker.pid() {
            Some(pid) => marker.to_string().replace(&pid.to_string(), "<pid>"),
            None => marker.to_string(),
        })
        .collect()
}
