//! Engine configuration and run summary types.

use crate::event::Event;
use crate::execution::ExecutionConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a single simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub execution: ExecutionConfig,
    /// Keep every event in the run journal, in routing order.
    pub record_events: bool,
}

impl EngineConfig {
    pub fn new(execution: ExecutionConfig) -> Self {
        Self {
            execution,
            record_events: false,
        }
    }

    pub fn recording(mut self) -> Self {
        self.record_events = true;
        self
    }
}

/// Counters and journal produced by [`super::Engine::run`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub bars_processed: usize,
    pub signals: usize,
    pub orders_submitted: usize,
    pub orders_rejected: usize,
    pub fills_executed: usize,
    pub zero_fills: usize,
    pub total_commission: f64,
    /// Orders still pending when the data ran out. They were never evaluated.
    pub pending_at_end: usize,
    /// Every event seen by the kernel. Empty unless `record_events` is set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

impl RunSummary {
    pub fn total_fills(&self) -> usize {
        self.fills_executed + self.zero_fills
    }
}
