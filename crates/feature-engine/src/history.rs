//! Bounded per-symbol price history

use std::collections::{HashMap, VecDeque};

/// Recent prices per symbol, oldest first
#[derive(Debug, Clone)]
pub struct PriceHistory {
    series: HashMap<String, VecDeque<f64>>,
    /// Samples kept per symbol
    limit: usize,
}

impl PriceHistory {
    /// Create a history keeping at most `limit` samples per symbol
    pub fn new(limit: usize) -> Self {
        Self {
            series: HashMap::new(),
            limit: limit.max(1),
        }
    }

    /// Append a price, evicting the oldest sample once over the limit
    pub fn push(&mut self, symbol: &str, price: f64) {
        let limit = self.limit;
        if !self.series.contains_key(symbol) {
            self.series
                .insert(symbol.to_string(), VecDeque::with_capacity(limit + 1));
        }
        let Some(series) = self.series.get_mut(symbol) else {
            return;
        };

        series.push_back(price);
        while series.len() > limit {
            series.pop_front();
        }
    }

    /// Mean of the last `window` prices, or `0.0` if fewer are recorded
    pub fn moving_average(&self, symbol: &str, window: usize) -> f64 {
        let series = match self.series.get(symbol) {
            Some(series) if window > 0 && series.len() >= window => series,
            _ => return 0.0,
        };

        let sum: f64 = series.iter().skip(series.len() - window).sum();
        sum / window as f64
    }

    /// Number of samples held for `symbol`
    pub fn len(&self, symbol: &str) -> usize {
        self.series.get(symbol).map_or(0, VecDeque::len)
    }

    /// Samples for `symbol`, oldest first
    pub fn samples(&self, symbol: &str) -> Vec<f64> {
        self.series
            .get(symbol)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Symbols seen so far
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<_> = self.series.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}
