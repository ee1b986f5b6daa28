use barsim_core::{Bar, DataError, DataSource, MarketUpdate};
use std::collections::{BTreeMap, VecDeque};

/// Replays a fixed list of market updates in order.
#[derive(Debug, Clone, Default)]
pub struct VecDataSource {
    updates: VecDeque<MarketUpdate>,
}

impl VecDataSource {
    pub fn new(updates: Vec<MarketUpdate>) -> Self {
        Self {
            updates: updates.into(),
        }
    }

    /// Group loose bars into one update per timestamp, ascending.
    ///
    /// A later bar for the same ticker and timestamp replaces an earlier one.
    pub fn from_bars(bars: impl IntoIterator<Item = Bar>) -> Self {
        let mut grouped: BTreeMap<_, MarketUpdate> = BTreeMap::new();
        for bar in bars {
            grouped
                .entry(bar.timestamp)
                .or_insert_with(|| MarketUpdate::new(bar.timestamp))
                .insert(bar);
        }
        Self {
            updates: grouped.into_values().collect(),
        }
    }

    /// Updates not yet delivered.
    pub fn remaining(&self) -> usize {
        self.updates.len()
    }
}

impl DataSource for VecDataSource {
    fn has_next(&self) -> bool {
        !self.updates.is_empty()
    }

    fn next(&mut self) -> Result<MarketUpdate, DataError> {
        self.updates
            .pop_front()
            .ok_or_else(|| DataError::Unavailable("no more market updates".into()))
    }
}
