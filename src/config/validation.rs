//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays and ticks > 0, bounded)
//! - Reject unknown log levels before the subscriber is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WorkerConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::WorkerConfig;

/// Upper bound for the cleanup delay.
///
/// A supervisor gives a stopping process 10s before escalating to SIGKILL; a
/// longer cleanup would never be observed completing.
pub const MAX_CLEANUP_DELAY_MS: u64 = 10_000;

pub const MAX_IDLE_TICK_MS: u64 = 60_000;

pub const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("shutdown.cleanup_delay_ms must be between 1 and {max}, got {value}")]
    CleanupDelayOutOfRange { value: u64, max: u64 },

    #[error("idle.tick_ms must be between 1 and {max}, got {value}")]
    IdleTickOutOfRange { value: u64, max: u64 },

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error, off")]
    UnknownLogLevel(String),
}

/// Check a deserialized config, collecting every problem found.
pub fn validate_config(config: &WorkerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let delay = config.shutdown.cleanup_delay_ms;
    if !(1..=MAX_CLEANUP_DELAY_MS).contains(&delay) {
        errors.push(ValidationError::CleanupDelayOutOfRange {
            value: delay,
            max: MAX_CLEANUP_DELAY_MS,
        });
    }

    let tick = config.idle.tick_ms;
    if !(1..=MAX_IDLE_TICK_MS).contains(&tick) {
        errors.push(ValidationError::IdleTickOutOfRange {
            value: tick,
            max: MAX_IDLE_TICK_MS,
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
