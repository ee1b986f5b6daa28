//! Order types and submission-time validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// What kind of order and its price parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Fill at the bar's open price.
    Market,
    /// Fill at the limit price if the bar traded through it.
    Limit { limit_price: f64 },
}

/// Errors raised when an order is submitted to the matcher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    #[error("order for {ticker} has non-positive quantity {quantity}")]
    NonPositiveQuantity { ticker: String, quantity: f64 },

    #[error("order for {ticker} has non-finite quantity")]
    NonFiniteQuantity { ticker: String },

    #[error("limit order for {ticker} has non-finite limit price")]
    NonFiniteLimitPrice { ticker: String },

    #[error("limit order for {ticker} has non-positive limit price {limit_price}")]
    NonPositiveLimitPrice { ticker: String, limit_price: f64 },
}

/// A standing instruction to trade one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub ticker: String,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub quantity: f64,
}

impl Order {
    pub fn market(ticker: impl Into<String>, side: OrderSide, quantity: f64) -> Self {
        Self {
            ticker: ticker.into(),
            side,
            kind: OrderKind::Market,
            quantity,
        }
    }

    pub fn limit(
        ticker: impl Into<String>,
        side: OrderSide,
        quantity: f64,
        limit_price: f64,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            side,
            kind: OrderKind::Limit { limit_price },
            quantity,
        }
    }

    /// The limit price, if this is a limit order.
    pub fn limit_price(&self) -> Option<f64> {
        match self.kind {
            OrderKind::Market => None,
            OrderKind::Limit { limit_price } => Some(limit_price),
        }
    }

    /// Check the order invariants: finite positive quantity and limit price.
    pub fn validate(&self) -> Result<(), OrderError> {
        if !self.quantity.is_finite() {
            return Err(OrderError::NonFiniteQuantity {
                ticker: self.ticker.clone(),
            });
        }
        if self.quantity <= 0.0 {
            return Err(OrderError::NonPositiveQuantity {
                ticker: self.ticker.clone(),
                quantity: self.quantity,
            });
        }
        if let Some(price) = self.limit_price() {
            if !price.is_finite() {
                return Err(OrderError::NonFiniteLimitPrice {
                    ticker: self.ticker.clone(),
                });
            }
            if price <= 0.0 {
                return Err(OrderError::NonPositiveLimitPrice {
                    ticker: self.ticker.clone(),
                    limit_price: price,
                });
            }
        }
        Ok(())
    }
}
