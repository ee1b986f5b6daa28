//! Reference strategies.
//!
//! - [`DipBuyer`]: fast-RSI dip entries priced off ATR, overbought exits
//! - [`BuyAndHold`]: enter every ticker once

pub mod buy_and_hold;
pub mod dip_buyer;
pub mod indicators;

pub use buy_and_hold::{BuyAndHold, BUY_AND_HOLD_ID};
pub use dip_buyer::{DipBuyer, DipBuyerConfig, DIP_BUYER_ID, EXIT_SIGNAL};

use barsim_core::Strategy;

use crate::config::StrategyConfig;

/// Build the configured strategy.
pub fn build_strategy(config: &StrategyConfig) -> Box<dyn Strategy> {
    match config {
        StrategyConfig::DipBuyer(params) => Box::new(DipBuyer::new(params.clone())),
        StrategyConfig::BuyAndHold => Box::new(BuyAndHold::new()),
    }
}
