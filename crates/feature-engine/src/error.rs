//! Analyzer Error Types

use thiserror::Error;

/// Errors raised while configuring the technical analyzer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzerError {
    /// Window is zero or longer than the retained history
    #[error("Invalid moving-average window {window} (history keeps {history_limit} samples)")]
    InvalidWindow { window: usize, history_limit: usize },
}
