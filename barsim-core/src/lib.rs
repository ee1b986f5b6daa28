//! barsim core: event model, order matcher, bar-by-bar simulation kernel.
//!
//! This crate contains the simulation mechanics only:
//! - Domain types (bars, market updates, orders, fills, signals)
//! - The `Event` sum type and the `EventSink` publish channel
//! - The order matcher with its commission and slippage rules
//! - The engine's fixed per-bar dispatch loop
//! - Traits for the pluggable data source, strategy and portfolio

pub mod domain;
pub mod engine;
pub mod error;
pub mod event;
pub mod execution;
pub mod sink;
pub mod traits;

pub use domain::{Bar, Fill, MarketUpdate, Order, OrderError, OrderKind, OrderSide, Signal};
pub use engine::{Engine, EngineConfig, RunSummary};
pub use error::{DataError, EngineError};
pub use event::{Event, EventKind};
pub use execution::{ExecutionConfig, MissingBarPolicy, OrderMatcher, SlippagePolicy};
pub use sink::{EventQueue, EventSink, RecordingSink};
pub use traits::{DataSource, Portfolio, Strategy};
