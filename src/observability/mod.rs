//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle / observer / binaries
//!     → tracing events (structured fields: pid, signal, delays)
//!     → logging.rs (EnvFilter + fmt layer)
//!     → stderr
//! ```
//!
//! # Design Decisions
//! - Stdout is reserved for marker lines, so logs never go there
//! - `RUST_LOG` overrides the configured level
//! - Quiet by default (`warn`)

pub mod logging;

pub use logging::init_logging;
