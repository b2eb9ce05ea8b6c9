//! Shared-Memory Quote Pipeline
//!
//! Wires exchange feeds, the shared ring buffer, the analytics consumers and
//! the telemetry reporter together, and drives their start/stop lifecycle.

mod config;
mod error;
mod lifecycle;
mod signal;

pub use crate::config::PipelineConfig;
pub use error::PipelineError;
pub use lifecycle::{LifecycleState, Pipeline, RunSummary, StopReason};
pub use signal::shutdown_signal;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging() -> Result<(), PipelineError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| PipelineError::Logging(e.to_string()))
}
