//! Process-level tests for the worker binary.
#![cfg(unix)]

use std::io::Write;
use std::time::Duration;

use graceful_worker::observer::{
    ExitOutcome, Launch, ObserverError, ShutdownSequence, MIN_CLEANUP_GAP,
};
use graceful_worker::{Marker, ShutdownSignal};

mod common;

#[tokio::test]
async fn test_startup_marker_carries_own_pid() {
    let (process, announced) = common::start(Launch::direct(common::worker_bin())).await;

    assert_eq!(announced, process.pid());
    let first = &process.transcript().lines()[0];
    assert_eq!(first.text, format!("PROCESS_STARTED_PID={announced}"));
}

#[tokio::test]
async fn test_idles_silently_without_signal() {
    let (mut process, _) = common::start(Launch::direct(common::worker_bin())).await;

    let next = process.next_line(Duration::from_secs(3)).await;
    assert!(
        matches!(next, Err(ObserverError::Timeout { .. })),
        "expected no output while idle, got {next:?}"
    );
    assert_eq!(process.try_wait().unwrap(), None, "worker exited on its own");
}

#[tokio::test]
async fn test_sigterm_scenario() {
    let (mut process, pid) = common::start(Launch::direct(common::worker_bin())).await;

    process.signal(ShutdownSignal::Terminate).unwrap();

    process
        .expect_marker("GRACEFUL_SHUTDOWN_START", Duration::from_secs(1), |m| {
            *m == Marker::ShutdownStart
        })
        .await
        .unwrap();
    let pid_line = process
        .next_line(Duration::from_secs(1))
        .await
        .unwrap()
        .expect("pid line");
    assert_eq!(pid_line.marker, Some(Marker::ShutdownPid { pid }));

    let complete = process
        .expect_marker("GRACEFUL_SHUTDOWN_COMPLETE", Duration::from_secs(2), |m| {
            *m == Marker::ShutdownComplete
        })
        .await
        .unwrap();
    assert!(complete.at - pid_line.at >= MIN_CLEANUP_GAP);

    assert_eq!(
        process.wait(Duration::from_secs(2)).await.unwrap(),
        ExitOutcome::Exited(0)
    );
    assert!(process.drain(Duration::from_secs(1)).await.unwrap());

    let sequence = ShutdownSequence::verify(process.transcript(), MIN_CLEANUP_GAP).unwrap();
    assert_eq!(sequence.pid, pid);
}

#[tokio::test]
async fn test_reaping_before_reading_keeps_cleanup_gap() {
    let (mut process, pid) = common::start(Launch::direct(common::worker_bin())).await;

    process.signal(ShutdownSignal::Terminate).unwrap();
    assert_eq!(
        process.wait(Duration::from_secs(3)).await.unwrap(),
        ExitOutcome::Exited(0)
    );
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(process.drain(Duration::from_secs(1)).await.unwrap());

    let sequence = ShutdownSequence::verify(process.transcript(), MIN_CLEANUP_GAP).unwrap();
    assert_eq!(sequence.pid, pid);
    assert!(sequence.cleanup >= MIN_CLEANUP_GAP);
}

#[tokio::test]
async fn test_sigint_and_sigterm_are_equivalent() {
    let mut runs = Vec::new();

    for signal in ShutdownSignal::ALL {
        let (mut process, _) = common::start(Launch::direct(common::worker_bin())).await;
        process.signal(signal).unwrap();

        let outcome = process.wait(Duration::from_secs(3)).await.unwrap();
        process.drain(Duration::from_secs(1)).await.unwrap();

        ShutdownSequence::verify(process.transcript(), MIN_CLEANUP_GAP)
            .unwrap_or_else(|violation| panic!("{signal}: {violation}"));
        runs.push((common::normalized_markers(&process), outcome));
    }

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].1, ExitOutcome::Exited(0));
}

#[tokio::test]
async fn test_second_signal_during_cleanup_is_absorbed() {
    let (mut process, _) = common::start(Launch::direct(common::worker_bin())).await;

    process.signal(ShutdownSignal::Terminate).unwrap();
    process
        .expect_marker("GRACEFUL_SHUTDOWN_START", Duration::from_secs(1), |m| {
            *m == Marker::ShutdownStart
        })
        .await
        .unwrap();
    process.signal(ShutdownSignal::Interrupt).unwrap();

    assert_eq!(
        process.wait(Duration::from_secs(3)).await.unwrap(),
        ExitOutcome::Exited(0)
    );
    process.drain(Duration::from_secs(1)).await.unwrap();
    ShutdownSequence::verify(process.transcript(), MIN_CLEANUP_GAP).unwrap();
}

#[tokio::test]
async fn test_configured_cleanup_delay() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[shutdown]\ncleanup_delay_ms = 600").unwrap();

    let launch = Launch::direct(common::worker_bin())
        .arg("--config")
        .arg(config.path());
    let (mut process, _) = common::start(launch).await;

    process.signal(ShutdownSignal::Terminate).unwrap();
    process.wait(Duration::from_secs(3)).await.unwrap();
    process.drain(Duration::from_secs(1)).await.unwrap();

    let sequence =
        ShutdownSequence::verify(process.transcript(), Duration::from_millis(550)).unwrap();
    assert!(sequence.cleanup >= Duration::from_millis(550));
}

#[tokio::test]
async fn test_invalid_config_fails_without_output() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[shutdown]\ncleanup_delay_ms = 0").unwrap();

    let launch = Launch::direct(common::worker_bin())
        .arg("--config")
        .arg(config.path());
    let mut process = graceful_worker::observer::FixtureProcess::spawn(&launch).unwrap();

    assert_eq!(
        process.wait(Duration::from_secs(5)).await.unwrap(),
        ExitOutcome::Exited(1)
    );
    assert!(process.drain(Duration::from_secs(1)).await.unwrap());
    assert!(process.transcript().lines().is_empty());
}

#[tokio::test]
async fn test_stop_escalation_not_needed_for_cooperative_worker() {
    let (mut process, _) = common::start(Launch::direct(common::worker_bin())).await;

    let outcome = process.stop(Duration::from_secs(5)).await.unwrap();
    assert_eq!(outcome, ExitOutcome::Exited(0));
}
