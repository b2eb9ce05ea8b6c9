//! Feature Engineering Engine
//!
//! Keeps a bounded price history per symbol and derives trailing moving
//! averages from quotes drained out of the shared buffer.

mod analyzer;
mod error;
mod history;

pub use analyzer::{AnalyzerConfig, TechnicalAnalyzer};
pub use error::AnalyzerError;
pub use history::PriceHistory;
