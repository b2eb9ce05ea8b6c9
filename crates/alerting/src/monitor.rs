//! Price Monitor Implementation

use ring_buffer::{Quote, RingBuffer};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Price monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Prices strictly above this raise an alert (default: 140.0)
    pub price_threshold: f64,
    /// Buffer poll interval in microseconds (default: 50)
    pub poll_interval_us: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            price_threshold: 140.0,
            poll_interval_us: 50,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us.max(1))
    }
}

/// Consumer that raises alerts on high prices
pub struct PriceMonitor {
    /// Configuration
    config: MonitorConfig,
    /// Shared buffer
    buffer: Arc<RingBuffer>,
    /// Quotes inspected
    processed: AtomicU64,
    /// Quotes above the threshold
    alerts: AtomicU64,
}

impl PriceMonitor {
    /// Create a new price monitor
    pub fn new(config: MonitorConfig, buffer: Arc<RingBuffer>) -> Self {
        info!("Creating price monitor with threshold {:.2}", config.price_threshold);
        Self {
            config,
            buffer,
            processed: AtomicU64::new(0),
            alerts: AtomicU64::new(0),
        }
    }

    /// Count a quote and check it against the threshold. Returns `true` on alert.
    pub fn inspect(&self, quote: &Quote) -> bool {
        self.processed.fetch_add(1, Ordering::Relaxed);

        if quote.price > self.config.price_threshold {
            self.alerts.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Price alert: {} @ {:.2} on {} (threshold {:.2})",
                quote.symbol, quote.price, quote.exchange, self.config.price_threshold
            );
            return true;
        }
        false
    }

    /// Read at most one quote from the buffer. Returns `false` when it was empty.
    pub fn poll_once(&self) -> bool {
        match self.buffer.try_read() {
            Some(quote) => {
                self.inspect(&quote);
                quote.recycle();
                true
            }
            None => false,
        }
    }

    /// Run the polling loop until `shutdown` flips to `true`
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Starting price monitor");

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

        let (processed, alerts) = self.stats();
        info!("Price monitor stopped (processed {}, alerts {})", processed, alerts);
    }

    /// Quotes inspected so far
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Alerts raised so far
    pub fn alerts(&self) -> u64 {
        self.alerts.load(Ordering::Relaxed)
    }

    /// Get (processed, alerts)
    pub fn stats(&self) -> (u64, u64) {
        (self.processed(), self.alerts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_buffer::QuotePool;

    fn buffer(capacity: usize) -> Arc<RingBuffer> {
        Arc::new(RingBuffer::new(capacity, Arc::new(QuotePool::new())).unwrap())
    }

    fn quote(price: f64) -> Quote {
        Quote::new("AAPL", price, 1000, "NASDAQ")
    }

    #[test]
    fn test_threshold_is_strict() {
        let monitor = PriceMonitor::new(MonitorConfig::default(), buffer(4));

        assert!(monitor.inspect(&quote(145.0)));
        assert!(!monitor.inspect(&quote(140.0)));
        assert!(!monitor.inspect(&quote(120.0)));

        assert_eq!(monitor.stats(), (3, 1));
    }

    #[test]
    fn test_poll_once_drains_and_recycles() {
        let shared = buffer(4);
        let monitor = PriceMonitor::new(MonitorConfig::default(), Arc::clone(&shared));

        assert!(!monitor.poll_once());
        assert_eq!(monitor.processed(), 0);

        shared.try_write(quote(141.0));
        shared.try_write(quote(139.0));
        assert!(monitor.poll_once());
        assert!(monitor.poll_once());
        assert!(!monitor.poll_once());

        assert_eq!(monitor.stats(), (2, 1));
        assert!(shared.is_empty());
        assert_eq!(shared.pool().idle(), 1);
    }

    #[tokio::test]
    async fn test_run_drains_until_shutdown() {
        let shared = buffer(64);
        for price in [100.0, 141.0, 150.0, 99.0, 140.0] {
            assert!(shared.try_write(quote(price)));
        }

        let config = MonitorConfig {
            poll_interval_us: 500,
            ..Default::default()
        };
        let monitor = Arc::new(PriceMonitor::new(config, Arc::clone(&shared)));
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn({
            let monitor = Arc::clone(&monitor);
            async move { monitor.run(rx).await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();
        task.await.unwrap();

        assert_eq!(monitor.stats(), (5, 2));
        assert!(shared.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_monitor_leaves_buffer_alone() {
        let shared = buffer(8);
        shared.try_write(quote(145.0));
        let monitor = PriceMonitor::new(MonitorConfig::default(), Arc::clone(&shared));
        let (_tx, rx) = watch::channel(true);

        monitor.run(rx).await;
        assert_eq!(monitor.processed(), 0);
        assert_eq!(shared.len(), 1);
    }
}
