//! Exchange Quote Feeds
//!
//! Simulated exchanges that synthesize quotes on a fixed tick and push them
//! into the shared ring buffer, dropping quotes when the buffer is full.

mod config;
mod error;
mod exchange;

pub use config::ExchangeConfig;
pub use error::FeedError;
pub use exchange::Exchange;
