//! Signal-responsive worker fixture and the harness that observes it.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod observer;
pub mod output;

pub use config::WorkerConfig;
pub use lifecycle::{ShutdownSignal, Worker};
pub use output::{Marker, MarkerWriter};
