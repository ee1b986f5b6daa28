use serde::{Deserialize, Serialize};

/// A directional opinion emitted by a strategy.
///
/// The sign and magnitude of `value` are left to the portfolio to interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub strategy_id: String,
    pub ticker: String,
    pub value: f64,
}

impl Signal {
    pub fn new(strategy_id: impl Into<String>, ticker: impl Into<String>, value: f64) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            ticker: ticker.into(),
            value,
        }
    }
}
