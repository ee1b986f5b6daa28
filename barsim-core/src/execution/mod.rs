//! Order matcher: decides, per pending order per bar, whether and at what price it fills.
//!
//! The matcher owns the pending order set. Every call to
//! [`OrderMatcher::on_market_update`] evaluates each pending order against the
//! update and publishes exactly one [`Fill`] per evaluated order. Evaluated
//! orders are then dropped: an order lives for a single bar, and a strategy
//! that wants a standing limit must resubmit it.
//!
//! Pricing rules:
//! - Market: full quantity at the bar's open.
//! - Limit buy: at the limit iff `low <= limit`.
//! - Limit sell: at the limit iff `high >= limit`.
//! - Anything else, including a ticker with no bar, is a zero-fill.

pub mod cost_model;

pub use cost_model::{commission, CostModel, SlippagePolicy, NOTIONAL_CAP_FRACTION};

use crate::domain::{Bar, Fill, MarketUpdate, Order, OrderError, OrderKind, OrderSide};
use crate::event::Event;
use crate::sink::EventSink;
use serde::{Deserialize, Serialize};

/// What happens to a pending order whose ticker has no bar in the update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingBarPolicy {
    /// Publish a zero-fill and drop the order.
    #[default]
    ZeroFill,
    /// Keep the order pending and publish nothing for it.
    Carry,
}

/// Matcher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Per-share commission rate.
    pub commission_rate: f64,
    /// Fractional slippage. Only applied under [`SlippagePolicy::MarketOnly`].
    pub slippage: f64,
    pub slippage_policy: SlippagePolicy,
    pub missing_bar_policy: MissingBarPolicy,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            commission_rate: 0.35,
            slippage: 0.0005,
            slippage_policy: SlippagePolicy::Inert,
            missing_bar_policy: MissingBarPolicy::ZeroFill,
        }
    }
}

impl ExecutionConfig {
    pub fn new(slippage: f64, commission_rate: f64) -> Self {
        Self {
            commission_rate,
            slippage,
            ..Self::default()
        }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.commission_rate, self.slippage, self.slippage_policy)
    }
}

/// Holds pending orders and matches them against each market update.
pub struct OrderMatcher {
    config: ExecutionConfig,
    cost: CostModel,
    /// Pending orders in submission order.
    pending: Vec<Order>,
}

impl OrderMatcher {
    pub fn new(config: ExecutionConfig) -> Self {
        let cost = config.cost_model();
        Self {
            config,
            cost,
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    pub fn slippage(&self) -> f64 {
        self.config.slippage
    }

    pub fn commission_rate(&self) -> f64 {
        self.config.commission_rate
    }

    /// Add one order to the pending set. The matcher takes ownership.
    ///
    /// Invalid orders are rejected and never become pending.
    pub fn submit(&mut self, order: Order) -> Result<(), OrderError> {
        order.validate()?;
        tracing::trace!(ticker = %order.ticker, side = %order.side, qty = order.quantity, "order pending");
        self.pending.push(order);
        Ok(())
    }

    pub fn pending(&self) -> impl Iterator<Item = &Order> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Evaluate every pending order against `update`, publishing one fill each.
    ///
    /// Orders are evaluated in submission order, each independently against
    /// the same bar. Evaluated orders leave the pending set.
    pub fn on_market_update(&mut self, update: &MarketUpdate, sink: &mut dyn EventSink) {
        let pending = std::mem::take(&mut self.pending);

        for order in pending {
            let Some(bar) = update.bar(&order.ticker) else {
                match self.config.missing_bar_policy {
                    MissingBarPolicy::ZeroFill => {
                        tracing::trace!(ticker = %order.ticker, "no bar for pending order");
                        let fill = Fill::zero(order.ticker, order.side);
                        sink.publish(Event::fill(update.timestamp, fill));
                    }
                    MissingBarPolicy::Carry => self.pending.push(order),
                }
                continue;
            };

            let fill = self.evaluate(&order, bar);
            sink.publish(Event::fill(update.timestamp, fill));
        }
    }

    /// Match a single order against a single bar.
    pub fn evaluate(&self, order: &Order, bar: &Bar) -> Fill {
        let price = match order.kind {
            OrderKind::Market => Some(self.cost.market_price(bar.open, order.side)),
            OrderKind::Limit { limit_price } => match order.side {
                OrderSide::Buy if bar.low <= limit_price => Some(limit_price),
                OrderSide::Sell if bar.high >= limit_price => Some(limit_price),
                _ => None,
            },
        };

        match price {
            Some(price) => {
                let commission = self.cost.commission(order.quantity, price);
                Fill::executed(order.ticker.clone(), order.side, order.quantity, price, commission)
            }
            None => Fill::zero(order.ticker.clone(), order.side),
        }
    }
}
