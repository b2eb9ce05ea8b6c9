//! Ring Buffer Error Types

use thiserror::Error;

/// Errors raised while constructing a ring buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingBufferError {
    /// One slot is always kept free, so fewer than two slots can never hold a quote
    #[error("Ring buffer capacity must be at least 2, got {0}")]
    CapacityTooSmall(usize),
}
