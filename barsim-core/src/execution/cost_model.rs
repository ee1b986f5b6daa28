//! Cost model: commission and optional slippage.
//!
//! Commission is the cheaper of a 1% notional cap and a per-share rate.
//! Slippage is directional when enabled: buyers pay more, sellers receive less.

use crate::domain::OrderSide;
use serde::{Deserialize, Serialize};

/// Commission never exceeds this fraction of the execution's notional.
pub const NOTIONAL_CAP_FRACTION: f64 = 0.01;

/// Commission for one execution.
///
/// `commission = min(0.01 * quantity * price, rate * |quantity|)`, floored at zero.
/// A NaN or negative rate charges nothing.
pub fn commission(rate: f64, quantity: f64, price: f64) -> f64 {
    let per_share = rate * quantity.abs();
    let notional_cap = NOTIONAL_CAP_FRACTION * quantity * price;
    notional_cap.min(per_share).max(0.0)
}

/// Whether the configured slippage alters execution prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlippagePolicy {
    /// Slippage is stored but never applied.
    #[default]
    Inert,
    /// Market orders fill at `open * (1 ± slippage)`; limit orders fill at the limit.
    MarketOnly,
}

/// Commission rate plus slippage settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    /// Per-share commission rate.
    pub commission_rate: f64,
    /// Fractional slippage, e.g. 0.0005 = 5 bps.
    pub slippage: f64,
    pub slippage_policy: SlippagePolicy,
}

impl CostModel {
    pub fn new(commission_rate: f64, slippage: f64, slippage_policy: SlippagePolicy) -> Self {
        Self {
            commission_rate,
            slippage,
            slippage_policy,
        }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0, SlippagePolicy::Inert)
    }

    /// Price a market order fills at, given the bar's open.
    pub fn market_price(&self, open: f64, side: OrderSide) -> f64 {
        match self.slippage_policy {
            SlippagePolicy::Inert => open,
            SlippagePolicy::MarketOnly => match side {
                OrderSide::Buy => open * (1.0 + self.slippage),
                OrderSide::Sell => open * (1.0 - self.slippage),
            },
        }
    }

    pub fn commission(&self, quantity: f64, price: f64) -> f64 {
        commission(self.commission_rate, quantity, price)
    }
}
