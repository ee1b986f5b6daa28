//! Bar and MarketUpdate: the market data delivered to the kernel each tick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OHLCV snapshot for one ticker at one timestamp.
///
/// The kernel assumes `low <= open, close <= high` and never checks it.
/// Data sources that want to reject malformed rows can call [`Bar::is_sane`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ticker: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low and open/close inside the range.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// All bars delivered at one simulation tick, keyed by ticker.
///
/// Tickers are unique within an update. Iteration order is by ticker so that
/// strategies walking the map behave identically across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketUpdate {
    pub timestamp: DateTime<Utc>,
    pub bars: BTreeMap<String, Bar>,
}

impl MarketUpdate {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            bars: BTreeMap::new(),
        }
    }

    /// Build an update from bars. A later bar for the same ticker replaces an earlier one.
    pub fn from_bars(timestamp: DateTime<Utc>, bars: impl IntoIterator<Item = Bar>) -> Self {
        let bars = bars.into_iter().map(|b| (b.ticker.clone(), b)).collect();
        Self { timestamp, bars }
    }

    pub fn insert(&mut self, bar: Bar) {
        self.bars.insert(bar.ticker.clone(), bar);
    }

    pub fn bar(&self, ticker: &str) -> Option<&Bar> {
        self.bars.get(ticker)
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.bars.keys().map(String::as_str)
    }
}
