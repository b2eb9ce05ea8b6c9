//! Pipeline Error Types

use exchange_feed::FeedError;
use feature_engine::AnalyzerError;
use ring_buffer::RingBufferError;
use thiserror::Error;

/// Errors that prevent the pipeline from starting
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Buffer could not be created
    #[error("Ring buffer error: {0}")]
    Buffer(#[from] RingBufferError),

    /// An exchange feed is misconfigured
    #[error("Exchange feed error: {0}")]
    Feed(#[from] FeedError),

    /// The analyzer is misconfigured
    #[error("Analyzer error: {0}")]
    Analyzer(#[from] AnalyzerError),

    /// No producers were configured
    #[error("No exchanges configured")]
    NoExchanges,

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Global tracing subscriber was already installed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
