//! Alerting System
//!
//! Drains quotes from the shared buffer and counts prices above a threshold.

mod monitor;

pub use monitor::{MonitorConfig, PriceMonitor};
