//! Marker output subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle (startup / shutdown)
//!     → Marker (marker.rs, fixed vocabulary)
//!     → MarkerWriter (writer.rs, one line + flush per marker)
//!     → stdout
//!     → observer reads lines back and parses them into Marker
//! ```
//!
//! # Design Decisions
//! - Stdout carries markers only; diagnostics go to stderr
//! - Every marker is flushed before the next one is produced

pub mod marker;
pub mod writer;

pub use marker::{Marker, MarkerParseError};
pub use writer::MarkerWriter;
