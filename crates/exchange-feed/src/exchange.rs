//! Exchange Producer Implementation

use crate::{ExchangeConfig, FeedError};
use rand::seq::SliceRandom;
use rand::Rng;
use ring_buffer::{Quote, RingBuffer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Simulated exchange writing quotes into the shared buffer
pub struct Exchange {
    /// Configuration
    config: ExchangeConfig,
    /// Shared buffer
    buffer: Arc<RingBuffer>,
    /// Quotes accepted by the buffer
    produced: AtomicU64,
    /// Quotes dropped on a full buffer
    dropped: AtomicU64,
}

impl Exchange {
    /// Create a new exchange feed
    pub fn new(config: ExchangeConfig, buffer: Arc<RingBuffer>) -> Result<Self, FeedError> {
        config.validate()?;
        info!(
            "Exchange {} created with {} symbols, tick {:?}",
            config.name,
            config.symbols.len(),
            config.tick_interval()
        );

        Ok(Self {
            config,
            buffer,
            produced: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        })
    }

    /// Exchange name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Synthesize one quote from this exchange's symbol set
    pub fn generate(&self) -> Quote {
        let mut rng = rand::thread_rng();
        // `validate` guarantees a non-empty symbol list
        let symbol = self
            .config
            .symbols
            .choose(&mut rng)
            .map(String::as_str)
            .unwrap_or_default();

        Quote::new(
            symbol,
            rng.gen_range(self.config.min_price..self.config.max_price),
            rng.gen_range(self.config.min_volume..self.config.max_volume),
            self.config.name.as_str(),
        )
    }

    /// Generate one quote and offer it to the buffer
    pub fn publish_once(&self) -> bool {
        let quote = self.generate();
        if self.buffer.try_write(quote) {
            self.produced.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Run the generation loop until `shutdown` flips to `true`
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Starting exchange {}", self.config.name);

        let mut ticker = tokio::time::interval(self.config.tick_interval());
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
                    if !self.publish_once() {
                        debug!("Exchange {} dropped a quote: buffer full", self.config.name);
                    }
                }
            }
        }

        info!(
            "Exchange {} stopped (produced {}, dropped {})",
            self.config.name,
            self.produced(),
            self.dropped()
        );
    }

    /// Quotes accepted by the buffer
    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }

    /// Quotes dropped because the buffer was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
