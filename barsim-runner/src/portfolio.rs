//! Signal-driven portfolio: cash and position bookkeeping.
//!
//! Entry (positive signal value):
//! 1. Ignored if the ticker is held or has an order in flight
//! 2. Ignored if positions plus in-flight entries already fill `max_positions`
//! 3. LIMIT BUY at the signal value rounded to cents, sized to
//!    `floor(min(cash × allocation, unreserved cash) / price)`; skipped if zero
//!
//! Exit (negative signal value): MARKET SELL of the whole position, if held
//! and nothing is in flight for the ticker.
//!
//! Every fill, executed or zero, clears the ticker's in-flight marker.

use std::collections::BTreeMap;

use barsim_core::{Fill, Order, OrderSide, Portfolio, Signal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub max_positions: usize,
    /// Fraction of current cash committed to one entry.
    pub allocation: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            max_positions: 5,
            allocation: 0.2,
        }
    }
}

/// An open long position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub quantity: f64,
    pub avg_price: f64,
}

impl Position {
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.avg_price
    }
}

/// An order sent to the matcher whose fill has not come back yet.
#[derive(Debug, Clone, Copy, PartialEq)]
struct InFlight {
    side: OrderSide,
    /// Cash set aside for a pending buy.
    reserved: f64,
}

pub struct SignalPortfolio {
    config: PortfolioConfig,
    initial_capital: f64,
    cash: f64,
    positions: BTreeMap<String, Position>,
    in_flight: BTreeMap<String, InFlight>,
    outbox: Vec<Order>,
    realized_pnl: f64,
    commission_paid: f64,
}

impl SignalPortfolio {
    pub fn new(initial_capital: f64, config: PortfolioConfig) -> Self {
        Self {
            config,
            initial_capital,
            cash: initial_capital,
            positions: BTreeMap::new(),
            in_flight: BTreeMap::new(),
            outbox: Vec::new(),
            realized_pnl: 0.0,
            commission_paid: 0.0,
        }
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn position(&self, ticker: &str) -> Option<&Position> {
        self.positions.get(ticker)
    }

    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    pub fn commission_paid(&self) -> f64 {
        self.commission_paid
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    fn reserved_cash(&self) -> f64 {
        self.in_flight.values().map(|f| f.reserved).sum()
    }

    fn slots_used(&self) -> usize {
        let pending_entries = self
            .in_flight
            .values()
            .filter(|f| f.side == OrderSide::Buy)
            .count();
        self.positions.len() + pending_entries
    }

    fn enter(&mut self, signal: &Signal) {
        if self.positions.contains_key(&signal.ticker) || self.in_flight.contains_key(&signal.ticker) {
            return;
        }
        if self.slots_used() >= self.config.max_positions {
            tracing::debug!(ticker = %signal.ticker, "entry skipped: no free slot");
            return;
        }

        let price = (signal.value * 100.0).round() / 100.0;
        if price.is_nan() || price <= 0.0 {
            return;
        }
        let budget = (self.cash * self.config.allocation).min(self.cash - self.reserved_cash());
        let quantity = (budget / price).floor();
        if quantity.is_nan() || quantity < 1.0 {
            tracing::debug!(ticker = %signal.ticker, budget, price, "entry skipped: budget too small");
            return;
        }

        tracing::debug!(ticker = %signal.ticker, quantity, price, "limit buy");
        self.in_flight.insert(
            signal.ticker.clone(),
            InFlight {
                side: OrderSide::Buy,
                reserved: quantity * price,
            },
        );
        self.outbox
            .push(Order::limit(signal.ticker.clone(), OrderSide::Buy, quantity, price));
    }

    fn exit(&mut self, signal: &Signal) {
        if self.in_flight.contains_key(&signal.ticker) {
            return;
        }
        let Some(position) = self.positions.get(&signal.ticker) else {
            return;
        };

        tracing::debug!(ticker = %signal.ticker, quantity = position.quantity, "market sell");
        self.outbox.push(Order::market(
            signal.ticker.clone(),
            OrderSide::Sell,
            position.quantity,
        ));
        self.in_flight.insert(
            signal.ticker.clone(),
            InFlight {
                side: OrderSide::Sell,
                reserved: 0.0,
            },
        );
    }

    fn apply_fill(&mut self, fill: &Fill) {
        self.in_flight.remove(&fill.ticker);
        if fill.is_zero() {
            return;
        }

        self.commission_paid += fill.commission;
        match fill.side {
            OrderSide::Buy => {
                self.cash -= fill.notional() + fill.commission;
                let position = self
                    .positions
                    .entry(fill.ticker.clone())
                    .or_insert_with(|| Position {
                        ticker: fill.ticker.clone(),
                        quantity: 0.0,
                        avg_price: 0.0,
                    });
                let quantity = position.quantity + fill.quantity;
                position.avg_price = if position.quantity > 0.0 {
                    (position.cost_basis() + fill.notional()) / quantity
                } else {
                    fill.price
                };
                position.quantity = quantity;
            }
            OrderSide::Sell => {
                self.cash += fill.notional() - fill.commission;
                let Some(position) = self.positions.get_mut(&fill.ticker) else {
                    tracing::warn!(ticker = %fill.ticker, "sell fill without a position");
                    return;
                };
                let closed = fill.quantity.min(position.quantity);
                self.realized_pnl += (fill.price - position.avg_price) * closed;
                position.quantity -= closed;
                if position.quantity <= 0.0 {
                    self.positions.remove(&fill.ticker);
                }
            }
        }
    }
}

impl Portfolio for SignalPortfolio {
    fn on_signals(&mut self, signals: &[Signal]) {
        for signal in signals {
            if signal.value > 0.0 {
                self.enter(signal);
            } else if signal.value < 0.0 {
                self.exit(signal);
            }
        }
    }

    fn on_fills(&mut self, fills: &[Fill]) {
        for fill in fills {
            self.apply_fill(fill);
        }
    }

    fn send_orders(&mut self) -> Vec<Order> {
        std::mem::take(&mut self.outbox)
    }
}
