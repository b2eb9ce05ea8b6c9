//! Telemetry report rendering

use ring_buffer::BufferStats;
use serde::Serialize;
use std::fmt;

/// Throughput of one producer or consumer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputLine {
    pub name: String,
    /// Cumulative count since start
    pub count: u64,
    /// Count per second since start
    pub rate: f64,
    /// Alerts raised, for consumers that raise them
    pub alerts: Option<u64>,
}

/// Coarse process resource usage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceUsage {
    /// Runtime worker threads
    pub worker_threads: Option<usize>,
    /// Role loops currently running
    pub alive_roles: usize,
    /// Resident memory of the process
    pub memory_bytes: Option<u64>,
}

/// One status sample of the whole pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryReport {
    pub elapsed_secs: f64,
    pub buffer: BufferStats,
    /// Quotes rejected on a full buffer since start
    pub dropped: u64,
    pub producers: Vec<ThroughputLine>,
    pub consumers: Vec<ThroughputLine>,
    pub total_produced: u64,
    pub total_consumed: u64,
    pub produce_rate: f64,
    pub consume_rate: f64,
    pub resources: ResourceUsage,
}

impl fmt::Display for TelemetryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);
        writeln!(f, "{}", rule)?;
        writeln!(f, "Market quote pipeline - uptime {:.1}s", self.elapsed_secs)?;
        writeln!(f, "{}", rule)?;

        writeln!(f, "Shared buffer:")?;
        writeln!(
            f,
            "   write {} | read {} | used {}/{} ({:.1}%) | dropped {}",
            self.buffer.write_cursor,
            self.buffer.read_cursor,
            self.buffer.used,
            self.buffer.capacity,
            self.buffer.fill_percent(),
            self.dropped
        )?;

        writeln!(f, "\nProducers:")?;
        for line in &self.producers {
            writeln!(f, "   {}: {} quotes ({:.0}/s)", line.name, line.count, line.rate)?;
        }

        writeln!(f, "\nConsumers:")?;
        for line in &self.consumers {
            match line.alerts {
                Some(alerts) => writeln!(
                    f,
                    "   {}: {} processed ({:.0}/s) | alerts: {}",
                    line.name, line.count, line.rate, alerts
                )?,
                None => writeln!(f, "   {}: {} processed ({:.0}/s)", line.name, line.count, line.rate)?,
            }
        }

        writeln!(f, "\nSystem:")?;
        writeln!(f, "   produced: {:.0}/s", self.produce_rate)?;
        writeln!(f, "   consumed: {:.0}/s", self.consume_rate)?;
        match self.resources.worker_threads {
            Some(workers) => writeln!(f, "   worker threads: {}", workers)?,
            None => writeln!(f, "   worker threads: n/a")?,
        }
        writeln!(f, "   running roles: {}", self.resources.alive_roles)?;
        match self.resources.memory_bytes {
            Some(bytes) => write!(f, "   memory: {:.2} MB", bytes as f64 / 1024.0 / 1024.0),
            None => write!(f, "   memory: n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TelemetryReport {
        TelemetryReport {
            elapsed_secs: 2.0,
            buffer: BufferStats {
                write_cursor: 30,
                read_cursor: 10,
                used: 20,
                capacity: 100,
            },
            dropped: 3,
            producers: vec![ThroughputLine {
                name: "NASDAQ".into(),
                count: 400,
                rate: 200.0,
                alerts: None,
            }],
            consumers: vec![ThroughputLine {
                name: "price-monitor".into(),
                count: 380,
                rate: 190.0,
                alerts: Some(7),
            }],
            total_produced: 400,
            total_consumed: 380,
            produce_rate: 200.0,
            consume_rate: 190.0,
            resources: ResourceUsage {
                worker_threads: Some(4),
                alive_roles: 6,
                memory_bytes: None,
            },
        }
    }

    #[test]
    fn test_display_contains_key_figures() {
        let text = sample().to_string();
        assert!(text.contains("used 20/100 (20.0%)"));
        assert!(text.contains("NASDAQ: 400 quotes (200/s)"));
        assert!(text.contains("alerts: 7"));
        assert!(text.contains("memory: n/a"));
        assert!(text.contains("worker threads: 4"));
    }
}
