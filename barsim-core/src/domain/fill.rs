use crate::domain::order::OrderSide;
use serde::{Deserialize, Serialize};

/// Outcome of matching one order against one bar.
///
/// A zero `quantity` means the order did not execute. Price and commission
/// are then zero too, and the ticker and side still identify the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub ticker: String,
    pub side: OrderSide,
    pub quantity: f64,
    pub price: f64,
    pub commission: f64,
}

impl Fill {
    pub fn executed(
        ticker: impl Into<String>,
        side: OrderSide,
        quantity: f64,
        price: f64,
        commission: f64,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            side,
            quantity,
            price,
            commission,
        }
    }

    /// A non-execution for the given order.
    pub fn zero(ticker: impl Into<String>, side: OrderSide) -> Self {
        Self::executed(ticker, side, 0.0, 0.0, 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.quantity == 0.0
    }

    /// Gross value of the execution: quantity × price.
    pub fn notional(&self) -> f64 {
        self.quantity * self.price
    }
}
