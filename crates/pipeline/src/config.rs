//! Pipeline configuration

use crate::PipelineError;
use alerting::MonitorConfig;
use exchange_feed::ExchangeConfig;
use feature_engine::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use telemetry::ReporterConfig;

/// Top-level configuration; every field falls back to its default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ring buffer slots (default: 10000, one stays empty)
    pub buffer_capacity: usize,
    /// Idle containers kept by the quote pool (default: unbounded)
    pub pool_limit: Option<usize>,
    /// Producers
    pub exchanges: Vec<ExchangeConfig>,
    /// Threshold monitor
    pub monitor: MonitorConfig,
    /// Moving-average analyzer
    pub analyzer: AnalyzerConfig,
    /// Status reporter
    pub reporter: ReporterConfig,
    /// How long to run before shutting down (milliseconds, default: 10000)
    pub run_duration_ms: u64,
    /// How long to wait for roles before warning (milliseconds, default: 5000)
    pub shutdown_grace_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: ring_buffer::DEFAULT_CAPACITY,
            pool_limit: None,
            exchanges: ExchangeConfig::defaults(),
            monitor: MonitorConfig::default(),
            analyzer: AnalyzerConfig::default(),
            reporter: ReporterConfig::default(),
            run_duration_ms: 10_000,
            shutdown_grace_ms: 5_000,
        }
    }
}

impl PipelineConfig {
    /// Load overrides from a TOML/JSON/YAML file; the format follows the extension
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn run_duration(&self) -> Duration {
        Duration::from_millis(self.run_duration_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_match_reference_setup() {
        let config = PipelineConfig::default();
        assert_eq!(config.buffer_capacity, 10_000);
        assert_eq!(config.exchanges.len(), 3);
        assert_eq!(config.monitor.price_threshold, 140.0);
        assert_eq!(config.analyzer.window, 20);
        assert_eq!(config.run_duration(), Duration::from_secs(10));
        assert_eq!(config.reporter.interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_load_partial_file() {
        let path = std::env::temp_dir().join(format!("pipeline-config-{}.toml", std::process::id()));
        fs::write(
            &path,
            r#"
buffer_capacity = 64
run_duration_ms = 500

[monitor]
price_threshold = 145.5

[[exchanges]]
name = "LSE"
symbols = ["VOD", "BP"]
tick_interval_us = 2000
"#,
        )
        .unwrap();

        let config = PipelineConfig::load(&path);
        fs::remove_file(&path).ok();
        let config = config.unwrap();

        assert_eq!(config.buffer_capacity, 64);
        assert_eq!(config.run_duration(), Duration::from_millis(500));
        assert_eq!(config.monitor.price_threshold, 145.5);
        assert_eq!(config.monitor.poll_interval_us, 50);
        assert_eq!(config.exchanges.len(), 1);
        assert_eq!(config.exchanges[0].name, "LSE");
        assert_eq!(config.exchanges[0].max_price, 150.0);
        assert_eq!(config.analyzer, AnalyzerConfig::default());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let path = std::env::temp_dir().join("pipeline-config-does-not-exist.toml");
        assert!(matches!(PipelineConfig::load(&path), Err(PipelineError::Config(_))));
    }
}
