//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the worker.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,

    /// Idle loop settings.
    pub idle: IdleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Simulated cleanup between the pid line and the completion line.
    pub cleanup_delay_ms: u64,
}

impl ShutdownConfig {
    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.cleanup_delay_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            cleanup_delay_ms: 200,
        }
    }
}

/// Idle loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IdleConfig {
    /// Period of the idle loop's timed wait.
    pub tick_ms: u64,
}

impl IdleConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self { tick_ms: 1000 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default level for stderr diagnostics when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixture_contract() {
        let config = WorkerConfig::default();
        assert_eq!(config.shutdown.cleanup_delay(), Duration::from_millis(200));
        assert_eq!(config.idle.tick(), Duration::from_secs(1));
        assert_eq!(config.observability.log_level, "warn");
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: WorkerConfig = toml::from_str(
            r#"
            [shutdown]
            cleanup_delay_ms = 350
            "#,
        )
        .unwrap();

        assert_eq!(config.shutdown.cleanup_delay_ms, 350);
        assert_eq!(config.idle, IdleConfig::default());
        assert_eq!(config.observability, ObservabilityConfig::default());
    }

    #[test]
    fn empty_document_is_default() {
        let config: WorkerConfig = toml::from_str("").unwrap();
        assert_eq!(config, WorkerConfig::default());
    }
}
