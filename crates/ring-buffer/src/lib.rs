//! Shared-Memory Ring Buffer
//!
//! Provides the bounded circular buffer that connects exchange feeds to
//! analytics consumers, plus the container pool used on the read path.

mod buffer;
mod error;
mod pool;

pub use buffer::{BufferStats, RingBuffer, DEFAULT_CAPACITY};
pub use error::RingBufferError;
pub use pool::{Pooled, QuotePool};

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A single market quote streamed through the buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol
    pub symbol: String,
    /// Last traded price
    pub price: f64,
    /// Traded volume
    pub volume: i64,
    /// Time the quote was generated
    pub timestamp: SystemTime,
    /// Name of the originating exchange
    pub exchange: String,
}

impl Quote {
    /// Create a quote stamped with the current time
    pub fn new(symbol: impl Into<String>, price: f64, volume: i64, exchange: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume,
            timestamp: SystemTime::now(),
            exchange: exchange.into(),
        }
    }
}

impl Default for Quote {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            price: 0.0,
            volume: 0,
            timestamp: SystemTime::UNIX_EPOCH,
            exchange: String::new(),
        }
    }
}
