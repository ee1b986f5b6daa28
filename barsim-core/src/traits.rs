//! Collaborator interfaces the kernel drives.
//!
//! The engine only ever calls this small, fixed method set. Data ingestion,
//! the trading idea and position sizing all live behind these traits.

use crate::domain::{Fill, MarketUpdate, Order, Signal};
use crate::error::DataError;
use crate::sink::EventSink;

/// Source of time-ordered market updates.
///
/// Updates must come out in non-decreasing timestamp order; the engine does not re-sort.
pub trait DataSource {
    fn has_next(&self) -> bool;

    /// Fetch the next update. Never called when `has_next()` is false.
    fn next(&mut self) -> Result<MarketUpdate, DataError>;
}

/// Signal generation.
pub trait Strategy {
    /// Called once before the first bar.
    fn start(&mut self) {}

    /// React to a market update, publishing zero or more signals into `sink`.
    fn on_update(&mut self, update: &MarketUpdate, sink: &mut dyn EventSink);
}

/// Position sizing and bookkeeping.
pub trait Portfolio {
    fn on_signals(&mut self, signals: &[Signal]);

    fn on_fills(&mut self, fills: &[Fill]);

    /// Orders to submit for matching on the next bar. Called once per bar.
    fn send_orders(&mut self) -> Vec<Order>;
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<MarketUpdate, DataError> {
        (**self).next()
    }
}

impl<T: Strategy + ?Sized> Strategy for Box<T> {
    fn start(&mut self) {
        (**self).start()
    }

    fn on_update(&mut self, update: &MarketUpdate, sink: &mut dyn EventSink) {
        (**self).on_update(update, sink)
    }
}

impl<T: Portfolio + ?Sized> Portfolio for Box<T> {
    fn on_signals(&mut self, signals: &[Signal]) {
        (**self).on_signals(signals)
    }

    fn on_fills(&mut self, fills: &[Fill]) {
        (**self).on_fills(fills)
    }

    fn send_orders(&mut self) -> Vec<Order> {
        (**self).send_orders()
    }
}
