//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per binary
//! - Route every log line to stderr
//! - Resolve the level from `RUST_LOG` or the configured default

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` when set and parseable, else `default_level`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_ascii_lowercase()))
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
