//! Telemetry Reporter Implementation

use crate::resources::{runtime_workers, ResourceProbe};
use crate::{rate, ResourceUsage, RoleTracker, TelemetryReport, ThroughputLine};
use alerting::PriceMonitor;
use exchange_feed::Exchange;
use feature_engine::TechnicalAnalyzer;
use parking_lot::Mutex;
use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Reporter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Report interval in milliseconds (default: 2000)
    pub interval_ms: u64,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self { interval_ms: 2000 }
    }
}

impl ReporterConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// Read-only observer of the buffer and every role's counters
pub struct Reporter {
    config: ReporterConfig,
    buffer: Arc<RingBuffer>,
    exchanges: Vec<Arc<Exchange>>,
    monitor: Arc<PriceMonitor>,
    analyzer: Arc<TechnicalAnalyzer>,
    tracker: RoleTracker,
    probe: Arc<Mutex<ResourceProbe>>,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(
        config: ReporterConfig,
        buffer: Arc<RingBuffer>,
        exchanges: Vec<Arc<Exchange>>,
        monitor: Arc<PriceMonitor>,
        analyzer: Arc<TechnicalAnalyzer>,
        tracker: RoleTracker,
    ) -> Self {
        Self {
            config,
            buffer,
            exchanges,
            monitor,
            analyzer,
            tracker,
            probe: Arc::new(Mutex::new(ResourceProbe::new())),
        }
    }

    /// Sample everything once, computing rates over `elapsed`.
    ///
    /// The memory probe reads `/proc` inline; periodic callers on the runtime
    /// use [`Reporter::sample`] instead.
    pub fn snapshot(&self, elapsed: Duration) -> TelemetryReport {
        let memory_bytes = self.probe.lock().memory_bytes();
        self.assemble(elapsed, memory_bytes)
    }

    /// Same as [`Reporter::snapshot`], with the memory probe on the blocking pool
    pub async fn sample(&self, elapsed: Duration) -> TelemetryReport {
        let probe = Arc::clone(&self.probe);
        let sampled = tokio::task::spawn_blocking(move || {
            let mut probe = probe.lock();
            probe.memory_bytes()
        });
        let memory_bytes = match sampled.await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Memory sample failed: {}", e);
                None
            }
        };
        self.assemble(elapsed, memory_bytes)
    }

    fn assemble(&self, elapsed: Duration, memory_bytes: Option<u64>) -> TelemetryReport {
        let buffer = self.buffer.stats();

        let producers: Vec<_> = self
            .exchanges
            .iter()
            .map(|exchange| {
                let count = exchange.produced();
                ThroughputLine {
                    name: exchange.name().to_string(),
                    count,
                    rate: rate(count, elapsed),
                    alerts: None,
                }
            })
            .collect();

        let (monitor_processed, alerts) = self.monitor.stats();
        let analyzer_processed = self.analyzer.processed();
        let consumers = vec![
            ThroughputLine {
                name: "price-monitor".to_string(),
                count: monitor_processed,
                rate: rate(monitor_processed, elapsed),
                alerts: Some(alerts),
            },
            ThroughputLine {
                name: "technical-analyzer".to_string(),
                count: analyzer_processed,
                rate: rate(analyzer_processed, elapsed),
                alerts: None,
            },
        ];

        let total_produced = producers.iter().map(|p| p.count).sum();
        let total_consumed = consumers.iter().map(|c| c.count).sum();

        let resources = ResourceUsage {
            worker_threads: runtime_workers(),
            alive_roles: self.tracker.alive(),
            memory_bytes,
        };

        TelemetryReport {
            elapsed_secs: elapsed.as_secs_f64(),
            buffer,
            dropped: self.buffer.total_dropped(),
            producers,
            consumers,
            total_produced,
            total_consumed,
            produce_rate: rate(total_produced, elapsed),
            consume_rate: rate(total_consumed, elapsed),
            resources,
        }
    }

    /// Print a report every interval until `shutdown` flips to `true`
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Starting telemetry reporter (every {:?})", self.config.interval());

        let started = Instant::now();
        let period = self.config.interval();
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

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
                    let report = self.sample(started.elapsed()).await;
                    println!("\n{}", report);
                }
            }
        }

        info!("Telemetry reporter stopped");
    }
}
