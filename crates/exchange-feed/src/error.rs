//! Feed Error Types

use thiserror::Error;

/// Errors raised while configuring an exchange feed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// Exchange has no symbols to quote
    #[error("Exchange {0} has no symbols configured")]
    NoSymbols(String),

    /// Price range is empty, inverted, or too wide to sample
    #[error("Invalid price range [{min}, {max})")]
    InvalidPriceRange { min: f64, max: f64 },

    /// Volume range is empty or inverted
    #[error("Invalid volume range [{min}, {max})")]
    InvalidVolumeRange { min: i64, max: i64 },
}
