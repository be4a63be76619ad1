use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use graceful_worker::observability::init_logging;
use graceful_worker::observer::{
    FixtureProcess, Launch, ShutdownSequence, DEFAULT_STOP_GRACE, MIN_CLEANUP_GAP,
};
use graceful_worker::ShutdownSignal;

#[derive(Parser)]
#[command(name = "fixture-probe")]
#[command(about = "Run a program, signal it, and check its graceful shutdown markers", long_about = None)]
struct Cli {
    /// Signal to deliver once the program has announced itself (int or term)
    #[arg(short, long, default_value = "term")]
    signal: ShutdownSignal,

    /// Run the program under `sh -c` so it is a grandchild
    #[arg(long)]
    via_shell: bool,

    /// Signal the whole process group instead of the immediate child
    #[arg(long)]
    group: bool,

    #[arg(long, default_value_t = 5_000)]
    startup_timeout_ms: u64,

    /// Grace period after the signal before SIGKILL
    #[arg(long, default_value_t = DEFAULT_STOP_GRACE.as_millis() as u64)]
    shutdown_timeout_ms: u64,

    /// Log level for stderr diagnostics
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Program to observe
    program: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let launch = if cli.via_shell {
        Launch::via_shell(cli.program)
    } else {
        Launch::direct(cli.program)
    };
    let signal = cli.signal;
    let shutdown_timeout = Duration::from_millis(cli.shutdown_timeout_ms);

    let mut process = FixtureProcess::spawn(&launch)?;
    let pid = process
        .wait_for_startup(Duration::from_millis(cli.startup_timeout_ms))
        .await?;
    tracing::info!(pid, %signal, "Program started, delivering signal");

    if cli.group {
        process.signal_group(signal)?;
    } else {
        process.signal(signal)?;
    }

    let outcome = match process.wait(shutdown_timeout).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(error = %err, "Program did not exit in time, stopping");
            process.stop(Duration::ZERO).await?
        }
    };
    let drained = process.drain(shutdown_timeout).await?;

    print!("{}", process.transcript().render());
    println!("---");
    if launch.is_via_shell() {
        println!("exit: {outcome} (shell)");
    } else {
        println!("exit: {outcome}");
    }
    if !drained {
        println!("warning: output was still open when capture timed out");
    }

    let verdict = ShutdownSequence::verify(process.transcript(), MIN_CLEANUP_GAP);
    match &verdict {
        Ok(sequence) => println!(
            "sequence: ok (pid {}, cleanup {}ms)",
            sequence.pid,
            sequence.cleanup.as_millis()
        ),
        Err(violation) => println!("sequence: FAILED ({violation})"),
    }

    // Under a shell the outcome is the shell's; a group signal kills it even
    // when the program completes its shutdown.
    let exited_cleanly = launch.is_via_shell() || outcome.success();
    if verdict.is_ok() && exited_cleanly {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
