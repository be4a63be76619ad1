//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --config <PATH> (optional, TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → WorkerConfig (validated, immutable)
//!
//! No --config:
//!     → WorkerConfig::default()
//! ```
//!
//! # Design Decisions
//! - Every field has a default, so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - The worker consumes no environment variables for its behavior

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{IdleConfig, ObservabilityConfig, ShutdownConfig, WorkerConfig};
pub use validation::{validate_config, ValidationError};
