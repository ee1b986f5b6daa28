//! Runner: wires config, data source, strategy and portfolio into the engine.

use barsim_core::{DataError, DataSource, Engine, EngineError, RunSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, DataConfig, RunConfig, RunId};
use crate::data::{CsvDataSource, DateWindow, SyntheticDataSource};
use crate::portfolio::{Position, SignalPortfolio};
use crate::strategies::build_strategy;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Synthetic series start here when the config leaves `start_date` open.
pub const DEFAULT_SYNTHETIC_START: (i32, u32, u32) = (2016, 1, 1);

/// Outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub run_id: RunId,
    pub summary: RunSummary,
    pub initial_capital: f64,
    pub ending_cash: f64,
    pub positions: Vec<Position>,
    pub realized_pnl: f64,
    pub total_commission: f64,
}

impl RunReport {
    /// Cash plus open positions at cost.
    pub fn book_value(&self) -> f64 {
        self.ending_cash + self.positions.iter().map(Position::cost_basis).sum::<f64>()
    }
}

/// Build the configured data source, applying the date window.
pub fn build_data_source(config: &RunConfig) -> Result<Box<dyn DataSource>, RunError> {
    let window = DateWindow::new(config.start_date, config.end_date);
    match &config.data {
        DataConfig::Csv { path } => Ok(Box::new(CsvDataSource::from_path(path, window)?)),
        DataConfig::Synthetic {
            tickers,
            bars,
            seed,
        } => {
            let (y, m, d) = DEFAULT_SYNTHETIC_START;
            let start = config
                .start_date
                .or_else(|| NaiveDate::from_ymd_opt(y, m, d))
                .ok_or_else(|| ConfigError::Invalid("no synthetic start date".into()))?;
            Ok(Box::new(
                SyntheticDataSource::new(tickers, start, *bars, *seed).with_end(config.end_date),
            ))
        }
    }
}

/// Validate `config`, run it to completion, and report.
pub fn run_from_config(config: &RunConfig) -> Result<RunReport, RunError> {
    config.validate()?;
    let source = build_data_source(config)?;
    run_with_source(config, source)
}

/// Run `config` against an already-built data source.
pub fn run_with_source<D: DataSource>(config: &RunConfig, source: D) -> Result<RunReport, RunError> {
    let run_id = config.run_id();
    let span = tracing::info_span!("backtest", run_id = %run_id);
    let _enter = span.enter();

    let strategy = build_strategy(&config.strategy);
    let portfolio = SignalPortfolio::new(config.initial_capital, config.portfolio.clone());
    let mut engine = Engine::new(config.engine_config(), source, strategy, portfolio);

    let summary = engine.run()?;
    let (_, _, portfolio) = engine.into_parts();

    let report = RunReport {
        run_id,
        summary,
        initial_capital: portfolio.initial_capital(),
        ending_cash: portfolio.cash(),
        positions: portfolio.positions().cloned().collect(),
        realized_pnl: portfolio.realized_pnl(),
        total_commission: portfolio.commission_paid(),
    };
    tracing::info!(
        cash = report.ending_cash,
        positions = report.positions.len(),
        realized_pnl = report.realized_pnl,
        "backtest finished"
    );
    Ok(report)
}
