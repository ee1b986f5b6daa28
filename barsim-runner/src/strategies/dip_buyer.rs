//! Short-term mean reversion: buy sharp dips below a volatility band.
//!
//! Per ticker, keep a rolling window of bars. When the fast RSI is deeply
//! oversold, signal an entry with the limit price `close - ATR` as the value.
//! When the fast RSI is overbought, signal an exit with value `-1`.

use std::collections::{HashMap, VecDeque};

use barsim_core::{Bar, Event, EventSink, MarketUpdate, Signal, Strategy};
use serde::{Deserialize, Serialize};

use super::indicators::{atr, last, rsi};

pub const DIP_BUYER_ID: &str = "dip_buyer";

/// Value carried by an exit signal.
pub const EXIT_SIGNAL: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DipBuyerConfig {
    /// Bars kept per ticker.
    pub window: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    /// Enter when RSI <= this.
    pub entry_rsi: f64,
    /// Exit when RSI >= this.
    pub exit_rsi: f64,
}

impl Default for DipBuyerConfig {
    fn default() -> Self {
        Self {
            window: 30,
            rsi_period: 2,
            atr_period: 14,
            entry_rsi: 10.0,
            exit_rsi: 70.0,
        }
    }
}

impl DipBuyerConfig {
    /// Bars needed before both indicators are defined.
    pub fn warmup(&self) -> usize {
        self.rsi_period.max(self.atr_period) + 1
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.rsi_period == 0 || self.atr_period == 0 {
            return Err("strategy indicator periods must be at least 1".into());
        }
        if self.window < self.warmup() {
            return Err(format!(
                "strategy.window ({}) must hold at least {} bars",
                self.window,
                self.warmup()
            ));
        }
        if !(0.0..=100.0).contains(&self.entry_rsi) || !(0.0..=100.0).contains(&self.exit_rsi) {
            return Err("strategy RSI thresholds must lie in [0, 100]".into());
        }
        if self.entry_rsi >= self.exit_rsi {
            return Err(format!(
                "strategy.entry_rsi ({}) must be below exit_rsi ({})",
                self.entry_rsi, self.exit_rsi
            ));
        }
        Ok(())
    }
}

pub struct DipBuyer {
    config: DipBuyerConfig,
    windows: HashMap<String, VecDeque<Bar>>,
}

impl DipBuyer {
    pub fn new(config: DipBuyerConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
        }
    }

    pub fn config(&self) -> &DipBuyerConfig {
        &self.config
    }

    /// Evaluate one ticker's window after appending `bar`.
    fn evaluate(&mut self, bar: &Bar) -> Option<f64> {
        let window = self.windows.entry(bar.ticker.clone()).or_default();
        window.push_back(bar.clone());
        while window.len() > self.config.window {
            window.pop_front();
        }
        if window.len() < self.config.warmup() {
            return None;
        }

        let bars = window.make_contiguous();
        let rsi = last(&rsi(bars, self.config.rsi_period))?;
        if rsi <= self.config.entry_rsi {
            let atr = last(&atr(bars, self.config.atr_period))?;
            let entry = bar.close - atr;
            (entry > 0.0).then_some(entry)
        } else if rsi >= self.config.exit_rsi {
            Some(EXIT_SIGNAL)
        } else {
            None
        }
    }
}

impl Default for DipBuyer {
    fn default() -> Self {
        Self::new(DipBuyerConfig::default())
    }
}

impl Strategy for DipBuyer {
    fn start(&mut self) {
        self.windows.clear();
    }

    fn on_update(&mut self, update: &MarketUpdate, sink: &mut dyn EventSink) {
        for bar in update.bars.values() {
            if bar.is_void() {
                continue;
            }
            if let Some(value) = self.evaluate(bar) {
                tracing::debug!(ticker = %bar.ticker, value, "dip_buyer signal");
                sink.publish(Event::signal(
                    update.timestamp,
                    Signal::new(DIP_BUYER_ID, bar.ticker.clone(), value),
                ));
            }
        }
    }
}
