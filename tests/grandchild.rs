//! The worker as a grandchild behind `sh -c`, the way supervisors usually
//! run it.
#![cfg(unix)]

use std::time::Duration;

use graceful_worker::observer::{Launch, ObserverError, ShutdownSequence, MIN_CLEANUP_GAP};
use graceful_worker::{Marker, ShutdownSignal};

mod common;

#[tokio::test]
async fn test_worker_runs_as_grandchild() {
    let (process, announced) = common::start(Launch::via_shell(common::worker_bin())).await;

    // The shell stays in between instead of exec-ing the worker.
    assert_ne!(announced, process.pid());
}

#[tokio::test]
async fn test_group_stop_captures_grandchild_shutdown() {
    let (mut process, announced) = common::start(Launch::via_shell(common::worker_bin())).await;

    // The shell exits on SIGTERM right away; the worker keeps writing to the
    // inherited pipe until its cleanup completes.
    process.stop(Duration::from_secs(10)).await.unwrap();
    assert!(
        process.drain(Duration::from_secs(5)).await.unwrap(),
        "worker never closed stdout"
    );

    let sequence = ShutdownSequence::verify(process.transcript(), MIN_CLEANUP_GAP)
        .unwrap_or_else(|violation| panic!("{violation}\n{}", process.transcript().render()));
    assert_eq!(sequence.pid, announced);
}

#[tokio::test]
async fn test_signalling_only_the_shell_misses_the_grandchild() {
    let (mut process, _) = common::start(Launch::via_shell(common::worker_bin())).await;

    process.signal(ShutdownSignal::Terminate).unwrap();
    let shell = process.wait(Duration::from_secs(2)).await.unwrap();
    assert!(!shell.success());

    let start = process
        .expect_marker("GRACEFUL_SHUTDOWN_START", Duration::from_secs(1), |m| {
            *m == Marker::ShutdownStart
        })
        .await;
    assert!(matches!(start, Err(ObserverError::Timeout { .. })));
    // Dropping the process kills the orphaned worker's group.
}
