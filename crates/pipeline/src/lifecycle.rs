//! Pipeline lifecycle controller
//!
//! `Starting -> Running -> Stopping -> Stopped`. Every role runs as its own
//! task and watches one cancellation channel; shutdown is always cooperative
//! and the controller never aborts a task.

use crate::{PipelineConfig, PipelineError};
use alerting::PriceMonitor;
use exchange_feed::Exchange;
use feature_engine::TechnicalAnalyzer;
use ring_buffer::{QuotePool, RingBuffer};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use telemetry::{Reporter, RoleTracker, TelemetryReport};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Lifecycle state of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Why the pipeline stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// The configured run window elapsed
    Elapsed,
    /// An external interrupt arrived first
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Elapsed => write!(f, "run window elapsed"),
            StopReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Final counts, taken after every role has exited
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub reason: StopReason,
    pub report: TelemetryReport,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline stopped: {}", self.reason)?;
        write!(f, "{}", self.report)
    }
}

/// Owns every role and the cancellation signal they observe
pub struct Pipeline {
    config: PipelineConfig,
    state: LifecycleState,
    buffer: Arc<RingBuffer>,
    exchanges: Vec<Arc<Exchange>>,
    monitor: Arc<PriceMonitor>,
    analyzer: Arc<TechnicalAnalyzer>,
    reporter: Arc<Reporter>,
    tracker: RoleTracker,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<(String, JoinHandle<()>)>,
    started: Instant,
    reason: Option<StopReason>,
}

impl Pipeline {
    /// Build every component and launch each role as its own task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: PipelineConfig) -> Result<Self, PipelineError> {
        info!("Pipeline starting");
        if config.exchanges.is_empty() {
            return Err(PipelineError::NoExchanges);
        }

        let pool = Arc::new(match config.pool_limit {
            Some(limit) => QuotePool::with_limit(limit),
            None => QuotePool::new(),
        });
        let buffer = Arc::new(RingBuffer::new(config.buffer_capacity, pool)?);

        let exchanges = config
            .exchanges
            .iter()
            .map(|ex| Exchange::new(ex.clone(), Arc::clone(&buffer)).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let monitor = Arc::new(PriceMonitor::new(config.monitor.clone(), Arc::clone(&buffer)));
        let analyzer = Arc::new(TechnicalAnalyzer::new(config.analyzer.clone(), Arc::clone(&buffer))?);

        let tracker = RoleTracker::new();
        let reporter = Arc::new(Reporter::new(
            config.reporter.clone(),
            Arc::clone(&buffer),
            exchanges.clone(),
            Arc::clone(&monitor),
            Arc::clone(&analyzer),
            tracker.clone(),
        ));

        let (shutdown_tx, _) = watch::channel(false);

        let mut pipeline = Self {
            config,
            state: LifecycleState::Starting,
            buffer,
            exchanges,
            monitor,
            analyzer,
            reporter,
            tracker,
            shutdown_tx,
            tasks: Vec::new(),
            started: Instant::now(),
            reason: None,
        };
        pipeline.launch_roles();

        pipeline.state = LifecycleState::Running;
        info!("Pipeline running with {} roles", pipeline.tasks.len());
        Ok(pipeline)
    }

    fn launch_roles(&mut self) {
        for exchange in self.exchanges.clone() {
            let name = format!("exchange:{}", exchange.name());
            let shutdown = self.shutdown_tx.subscribe();
            self.spawn_role(name, async move { exchange.run(shutdown).await });
        }

        let monitor = Arc::clone(&self.monitor);
        let shutdown = self.shutdown_tx.subscribe();
        self.spawn_role("price-monitor".into(), async move { monitor.run(shutdown).await });

        let analyzer = Arc::clone(&self.analyzer);
        let shutdown = self.shutdown_tx.subscribe();
        self.spawn_role("technical-analyzer".into(), async move { analyzer.run(shutdown).await });

        let reporter = Arc::clone(&self.reporter);
        let shutdown = self.shutdown_tx.subscribe();
        self.spawn_role("reporter".into(), async move { reporter.run(shutdown).await });
    }

    fn spawn_role<F>(&mut self, name: String, role: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let tracker = self.tracker.clone();
        let handle = tokio::spawn(async move {
            let _guard = tracker.enter();
            role.await;
        });
        self.tasks.push((name, handle));
    }

    /// Hold for the run window or until `interrupt` resolves, then shut down
    pub async fn run_until<F>(&mut self, interrupt: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        if self.state == LifecycleState::Running {
            let remaining = self.config.run_duration().saturating_sub(self.started.elapsed());
            let reason = tokio::select! {
                _ = tokio::time::sleep(remaining) => StopReason::Elapsed,
                _ = interrupt => StopReason::Interrupted,
            };
            info!("Stop requested: {}", reason);
            self.reason = Some(reason);
        }

        self.shutdown().await
    }

    /// Broadcast cancellation. Returns `true` only for the first call.
    pub fn cancel(&self) -> bool {
        let first = self.shutdown_tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        });
        if first {
            info!("Cancellation broadcast to {} roles", self.tasks.len());
        }
        first
    }

    /// Cancel every role and wait for all of them to exit
    pub async fn shutdown(&mut self) -> RunSummary {
        let reason = *self.reason.get_or_insert(StopReason::Interrupted);

        if self.state != LifecycleState::Stopped {
            self.state = LifecycleState::Stopping;
            self.cancel();
            self.join_roles().await;
            self.state = LifecycleState::Stopped;
            info!("Pipeline stopped after {:.1}s", self.started.elapsed().as_secs_f64());
        }

        RunSummary {
            reason,
            report: self.snapshot(),
        }
    }

    async fn join_roles(&mut self) {
        let deadline = tokio::time::Instant::now() + self.config.shutdown_grace();
        let mut warned = false;

        for (name, mut handle) in std::mem::take(&mut self.tasks) {
            let result = match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(result) => result,
                Err(_) => {
                    if !warned {
                        warn!(
                            "Roles still running after {:?} grace period, waiting",
                            self.config.shutdown_grace()
                        );
                        warned = true;
                    }
                    handle.await
                }
            };

            if let Err(e) = result {
                error!("Role {} terminated abnormally: {}", name, e);
            }
        }
    }

    /// Current report over the time since start
    pub fn snapshot(&self) -> TelemetryReport {
        self.reporter.snapshot(self.elapsed())
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn buffer(&self) -> &Arc<RingBuffer> {
        &self.buffer
    }

    pub fn exchanges(&self) -> &[Arc<Exchange>] {
        &self.exchanges
    }

    pub fn monitor(&self) -> &Arc<PriceMonitor> {
        &self.monitor
    }

    pub fn analyzer(&self) -> &Arc<TechnicalAnalyzer> {
        &self.analyzer
    }

    /// Roles whose loops are currently running
    pub fn alive_roles(&self) -> usize {
        self.tracker.alive()
    }
}
