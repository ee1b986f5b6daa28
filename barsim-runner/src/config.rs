//! Serializable run configuration, loaded from TOML.

use barsim_core::{EngineConfig, ExecutionConfig};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::portfolio::PortfolioConfig;
use crate::strategies::DipBuyerConfig;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Errors loading or validating a [`RunConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to reproduce a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    /// Inclusive window applied to the data. Either end may be open.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Log per-bar activity.
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub execution: ExecutionConfig,

    pub data: DataConfig,

    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub portfolio: PortfolioConfig,
}

fn default_initial_capital() -> f64 {
    100_000.0
}

/// Where market data comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DataConfig {
    /// Long-format CSV: `ticker,timestamp,open,high,low,close,volume`.
    Csv { path: PathBuf },

    /// Seeded random walk, one bar per ticker per weekday.
    Synthetic {
        tickers: Vec<String>,
        #[serde(default = "default_synthetic_bars")]
        bars: usize,
        #[serde(default)]
        seed: u64,
    },
}

fn default_synthetic_bars() -> usize {
    252
}

/// Which reference strategy to run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    DipBuyer(DipBuyerConfig),
    BuyAndHold,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::DipBuyer(DipBuyerConfig::default())
    }
}

impl RunConfig {
    /// Read and validate a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;

        // Relative CSV paths resolve against the config file's directory.
        if let DataConfig::Csv { path: csv_path } = &mut config.data {
            if csv_path.is_relative() {
                if let Some(dir) = path.parent() {
                    *csv_path = dir.join(&*csv_path);
                }
            }
        }
        Ok(config)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if self.execution.commission_rate.is_nan() || self.execution.commission_rate < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "execution.commission_rate must be >= 0, got {}",
                self.execution.commission_rate
            )));
        }
        if self.execution.slippage.is_nan() || self.execution.slippage < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "execution.slippage must be >= 0, got {}",
                self.execution.slippage
            )));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ConfigError::Invalid(format!(
                    "start_date {start} is after end_date {end}"
                )));
            }
        }
        if self.portfolio.max_positions == 0 {
            return Err(ConfigError::Invalid(
                "portfolio.max_positions must be at least 1".into(),
            ));
        }
        if !(self.portfolio.allocation > 0.0 && self.portfolio.allocation <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "portfolio.allocation must be in (0, 1], got {}",
                self.portfolio.allocation
            )));
        }
        if let DataConfig::Synthetic { tickers, .. } = &self.data {
            if tickers.is_empty() {
                return Err(ConfigError::Invalid(
                    "data.tickers must name at least one ticker".into(),
                ));
            }
        }
        if let StrategyConfig::DipBuyer(dip) = &self.strategy {
            dip.validate().map_err(ConfigError::Invalid)?;
        }
        Ok(())
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        // Plain data with string keys: serialization cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.execution.clone())
    }
}
