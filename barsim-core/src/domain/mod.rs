//! Domain types for barsim

pub mod bar;
pub mod fill;
pub mod order;
pub mod signal;

pub use bar::{Bar, MarketUpdate};
pub use fill::Fill;
pub use order::{Order, OrderError, OrderKind, OrderSide};
pub use signal::Signal;
