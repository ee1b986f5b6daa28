//! Error types for the simulation kernel.

use thiserror::Error;

/// Failure fetching a bar from a data source. Fatal to the run.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Errors that abort [`crate::engine::Engine::run`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("data source failed after {bars_processed} bars: {source}")]
    DataSource {
        bars_processed: usize,
        #[source]
        source: DataError,
    },
}
