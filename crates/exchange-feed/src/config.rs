//! Exchange feed configuration

use crate::FeedError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_tick_interval_us() -> u64 {
    100
}

fn default_min_price() -> f64 {
    100.0
}

fn default_max_price() -> f64 {
    150.0
}

fn default_min_volume() -> i64 {
    1_000
}

fn default_max_volume() -> i64 {
    11_000
}

/// Configuration for one simulated exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Exchange name, stamped on every quote as its origin
    pub name: String,

    /// Symbols this exchange may quote
    pub symbols: Vec<String>,

    /// Quote generation interval (microseconds, default: 100)
    #[serde(default = "default_tick_interval_us")]
    pub tick_interval_us: u64,

    /// Lower price bound, inclusive (default: 100.0)
    #[serde(default = "default_min_price")]
    pub min_price: f64,

    /// Upper price bound, exclusive (default: 150.0)
    #[serde(default = "default_max_price")]
    pub max_price: f64,

    /// Lower volume bound, inclusive (default: 1000)
    #[serde(default = "default_min_volume")]
    pub min_volume: i64,

    /// Upper volume bound, exclusive (default: 11000)
    #[serde(default = "default_max_volume")]
    pub max_volume: i64,
}

impl ExchangeConfig {
    /// Create a config with default timing and value ranges
    pub fn new(name: impl Into<String>, symbols: &[&str]) -> Self {
        Self {
            name: name.into(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            tick_interval_us: default_tick_interval_us(),
            min_price: default_min_price(),
            max_price: default_max_price(),
            min_volume: default_min_volume(),
            max_volume: default_max_volume(),
        }
    }

    /// NASDAQ preset
    pub fn nasdaq() -> Self {
        Self::new("NASDAQ", &["AAPL", "GOOGL", "MSFT", "TSLA"])
    }

    /// NYSE preset
    pub fn nyse() -> Self {
        Self::new("NYSE", &["AMZN", "META", "NVDA", "NFLX"])
    }

    /// Shanghai Stock Exchange preset
    pub fn sse() -> Self {
        Self::new("SSE", &["000001", "000002", "600000", "600036"])
    }

    /// The three venues run by default
    pub fn defaults() -> Vec<Self> {
        vec![Self::nasdaq(), Self::nyse(), Self::sse()]
    }

    /// Generation interval, never shorter than one microsecond
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(self.tick_interval_us.max(1))
    }

    /// Check that quotes can actually be generated from this config
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.symbols.is_empty() {
            return Err(FeedError::NoSymbols(self.name.clone()));
        }
        let prices_ok = self.min_price.is_finite()
            && self.max_price.is_finite()
            && self.min_price < self.max_price
            && (self.max_price - self.min_price).is_finite();
        if !prices_ok {
            return Err(FeedError::InvalidPriceRange {
                min: self.min_price,
                max: self.max_price,
            });
        }
        if self.min_volume >= self.max_volume {
            return Err(FeedError::InvalidVolumeRange {
                min: self.min_volume,
                max: self.max_volume,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for config in ExchangeConfig::defaults() {
            assert!(config.validate().is_ok(), "{} should validate", config.name);
            assert_eq!(config.symbols.len(), 4);
        }
    }

    #[test]
    fn test_rejects_empty_symbols() {
        let config = ExchangeConfig::new("EMPTY", &[]);
        assert_eq!(config.validate(), Err(FeedError::NoSymbols("EMPTY".into())));
    }

    #[test]
    fn test_rejects_inverted_ranges() {
        let mut config = ExchangeConfig::nasdaq();
        config.min_price = 150.0;
        config.max_price = 100.0;
        assert!(matches!(config.validate(), Err(FeedError::InvalidPriceRange { .. })));

        let mut config = ExchangeConfig::nasdaq();
        config.max_volume = config.min_volume;
        assert!(matches!(config.validate(), Err(FeedError::InvalidVolumeRange { .. })));
    }

    #[test]
    fn test_rejects_price_span_that_overflows() {
        let mut config = ExchangeConfig::sse();
        config.min_price = -1e308;
        config.max_price = 1e308;
        assert_eq!(
            config.validate(),
            Err(FeedError::InvalidPriceRange {
                min: -1e308,
                max: 1e308
            })
        );

        config.min_price = -1e307;
        config.max_price = 1e307;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut config = ExchangeConfig::nyse();
        config.tick_interval_us = 0;
        assert_eq!(config.tick_interval(), Duration::from_micros(1));
    }
}
