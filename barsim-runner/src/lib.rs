//! barsim runner: everything around the simulation kernel.
//!
//! This crate builds on `barsim-core` to provide:
//! - TOML run configuration with validation and content-hash run ids
//! - CSV, in-memory and synthetic data sources
//! - Reference strategies (dip buyer, buy-and-hold) and a signal-driven portfolio
//! - A config-to-report runner

pub mod config;
pub mod data;
pub mod portfolio;
pub mod runner;
pub mod strategies;

pub use config::{ConfigError, DataConfig, RunConfig, RunId, StrategyConfig};
pub use data::{CsvDataSource, DateWindow, SyntheticDataSource, VecDataSource};
pub use portfolio::{PortfolioConfig, Position, SignalPortfolio};
pub use runner::{build_data_source, run_from_config, run_with_source, RunError, RunReport};
pub use strategies::{build_strategy, BuyAndHold, DipBuyer, DipBuyerConfig};
