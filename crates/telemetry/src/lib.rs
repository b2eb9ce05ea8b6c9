//! Pipeline Telemetry
//!
//! Periodically samples buffer occupancy, per-role throughput and coarse
//! process resource usage, and renders a human-readable status report.
//! Nothing in this crate mutates pipeline state.

mod report;
mod reporter;
mod resources;
mod tracker;

pub use report::{ResourceUsage, TelemetryReport, ThroughputLine};
pub use reporter::{Reporter, ReporterConfig};
pub use resources::ResourceProbe;
pub use tracker::{RoleGuard, RoleTracker};

use std::time::Duration;

/// Events per second over `elapsed`, `0.0` before any time has passed
pub fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}
