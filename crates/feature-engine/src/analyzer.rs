//! Technical Analyzer Implementation

use crate::{AnalyzerError, PriceHistory};
use parking_lot::RwLock;
use ring_buffer::{Quote, RingBuffer};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Prices kept per symbol (default: 100)
    pub history_limit: usize,
    /// Moving-average window (default: 20)
    pub window: usize,
    /// Buffer poll interval in microseconds (default: 80)
    pub poll_interval_us: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            window: 20,
            poll_interval_us: 80,
        }
    }
}

impl AnalyzerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us.max(1))
    }

    /// The window must fit inside the retained history
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.window == 0 || self.window > self.history_limit {
            return Err(AnalyzerError::InvalidWindow {
                window: self.window,
                history_limit: self.history_limit,
            });
        }
        Ok(())
    }
}

/// Consumer maintaining per-symbol moving averages
pub struct TechnicalAnalyzer {
    /// Configuration
    config: AnalyzerConfig,
    /// Shared buffer
    buffer: Arc<RingBuffer>,
    /// Per-symbol price history
    history: RwLock<PriceHistory>,
    /// Quotes ingested
    processed: AtomicU64,
}

impl TechnicalAnalyzer {
    /// Create a new analyzer
    pub fn new(config: AnalyzerConfig, buffer: Arc<RingBuffer>) -> Result<Self, AnalyzerError> {
        config.validate()?;
        info!(
            "Creating technical analyzer: history={}, window={}",
            config.history_limit, config.window
        );
        Ok(Self {
            history: RwLock::new(PriceHistory::new(config.history_limit)),
            config,
            buffer,
            processed: AtomicU64::new(0),
        })
    }

    /// Record a quote and return the refreshed moving average for its symbol.
    ///
    /// Returns `0.0` until the symbol has a full window of samples.
    pub fn ingest(&self, quote: &Quote) -> f64 {
        self.processed.fetch_add(1, Ordering::Relaxed);

        let mut history = self.history.write();
        history.push(&quote.symbol, quote.price);
        history.moving_average(&quote.symbol, self.config.window)
    }

    /// Read at most one quote from the buffer. Returns `false` when it was empty.
    pub fn poll_once(&self) -> bool {
        match self.buffer.try_read() {
            Some(quote) => {
                let average = self.ingest(&quote);
                if average > 0.0 {
                    debug!("{} MA{} = {:.2}", quote.symbol, self.config.window, average);
                }
                quote.recycle();
                true
            }
            None => false,
        }
    }

    /// Run the polling loop until `shutdown` flips to `true`
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Starting technical analyzer");

        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    self.poll_once();
                }
            }
        }

        info!(
            "Technical analyzer stopped (processed {}, symbols {})",
            self.processed(),
            self.symbols().len()
        );
    }

    /// Current moving average for `symbol` (`0.0` if not yet available)
    pub fn moving_average(&self, symbol: &str) -> f64 {
        self.history.read().moving_average(symbol, self.config.window)
    }

    /// Samples held for `symbol`
    pub fn history_len(&self, symbol: &str) -> usize {
        self.history.read().len(symbol)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.history.read().symbols()
    }

    /// Quotes ingested so far
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_buffer::QuotePool;

    fn buffer(capacity: usize) -> Arc<RingBuffer> {
        Arc::new(RingBuffer::new(capacity, Arc::new(QuotePool::new())).unwrap())
    }

    #[test]
    fn test_ingest_reports_sentinel_then_average() {
        let analyzer = TechnicalAnalyzer::new(AnalyzerConfig::default(), buffer(4)).unwrap();
        let quote = Quote::new("GOOGL", 130.0, 500, "NASDAQ");

        for _ in 0..19 {
            assert_eq!(analyzer.ingest(&quote), 0.0);
        }
        assert!((analyzer.ingest(&quote) - 130.0).abs() < 1e-9);
        assert_eq!(analyzer.processed(), 20);
    }

    #[test]
    fn test_history_is_bounded() {
        let analyzer = TechnicalAnalyzer::new(AnalyzerConfig::default(), buffer(4)).unwrap();
        for i in 0..250 {
            analyzer.ingest(&Quote::new("META", i as f64, 1, "NYSE"));
        }
        assert_eq!(analyzer.history_len("META"), 100);
        // last 20 samples are 230..=249
        assert!((analyzer.moving_average("META") - 239.5).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_window_outside_history() {
        let config = AnalyzerConfig {
            history_limit: 10,
            window: 20,
            ..Default::default()
        };
        assert_eq!(
            TechnicalAnalyzer::new(config, buffer(4)).err(),
            Some(AnalyzerError::InvalidWindow {
                window: 20,
                history_limit: 10
            })
        );

        let config = AnalyzerConfig {
            window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_equal_to_history_produces_averages() {
        let config = AnalyzerConfig {
            history_limit: 10,
            window: 10,
            ..Default::default()
        };
        let analyzer = TechnicalAnalyzer::new(config, buffer(4)).unwrap();
        let quote = Quote::new("AMZN", 5.0, 1, "NYSE");

        let averages: Vec<f64> = (0..500).map(|_| analyzer.ingest(&quote)).collect();
        assert_eq!(averages[8], 0.0);
        assert!((averages[9] - 5.0).abs() < 1e-9);
        assert!((averages[499] - 5.0).abs() < 1e-9);
        assert_eq!(analyzer.history_len("AMZN"), 10);
    }

    #[tokio::test]
    async fn test_run_consumes_buffer() {
        let shared = buffer(64);
        for i in 0..10 {
            shared.try_write(Quote::new(if i % 2 == 0 { "AAPL" } else { "MSFT" }, 110.0, 1, "NASDAQ"));
        }

        let config = AnalyzerConfig {
            poll_interval_us: 500,
            ..Default::default()
        };
        let analyzer = Arc::new(TechnicalAnalyzer::new(config, Arc::clone(&shared)).unwrap());
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn({
            let analyzer = Arc::clone(&analyzer);
            async move { analyzer.run(rx).await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();
        task.await.unwrap();

        assert_eq!(analyzer.processed(), 10);
        assert_eq!(analyzer.symbols(), vec!["AAPL".to_string(), "MSFT".to_string()]);
        assert_eq!(analyzer.history_len("AAPL"), 5);
        assert!(shared.is_empty());
    }
}
