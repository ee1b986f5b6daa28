//! Long-format CSV loader.
//!
//! Expected header: `ticker,timestamp,open,high,low,close,volume`.
//! Timestamps are RFC 3339 or `YYYY-MM-DD` (midnight UTC). Rows may come in
//! any order; they are grouped by timestamp into ascending market updates.
//! The whole file is parsed up front, so a malformed row fails the load
//! before the first bar reaches the engine.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use barsim_core::{Bar, DataError, DataSource, MarketUpdate};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::{DateWindow, VecDataSource};

#[derive(Debug, Deserialize)]
struct CsvRow {
    ticker: String,
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Market updates loaded from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    inner: VecDataSource,
    rows_loaded: usize,
}

impl CsvDataSource {
    pub fn from_path(path: impl AsRef<Path>, window: DateWindow) -> Result<Self, DataError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let source = Self::from_reader(file, window)?;
        tracing::info!(
            path = %path.display(),
            rows = source.rows_loaded,
            updates = source.inner.remaining(),
            "loaded CSV bars"
        );
        Ok(source)
    }

    pub fn from_reader<R: Read>(reader: R, window: DateWindow) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers().map_err(csv_error)?.clone();

        let mut bars = Vec::new();
        let mut seen = HashSet::new();
        for result in rdr.records() {
            let record = result.map_err(csv_error)?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            let row: CsvRow = record
                .deserialize(Some(&headers))
                .map_err(|e| DataError::Parse {
                    line,
                    reason: e.to_string(),
                })?;

            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| DataError::Parse {
                line,
                reason: format!("unrecognised timestamp '{}'", row.timestamp),
            })?;
            if !window.contains(timestamp) {
                continue;
            }

            let bar = Bar {
                ticker: row.ticker,
                timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            };
            if !bar.is_sane() {
                return Err(DataError::Parse {
                    line,
                    reason: format!("inconsistent OHLC for {}", bar.ticker),
                });
            }
            if !seen.insert((bar.ticker.clone(), timestamp)) {
                return Err(DataError::Parse {
                    line,
                    reason: format!("duplicate bar for {} at {timestamp}", bar.ticker),
                });
            }
            bars.push(bar);
        }

        Ok(Self {
            rows_loaded: bars.len(),
            inner: VecDataSource::from_bars(bars),
        })
    }

    /// Rows kept after the date window was applied.
    pub fn rows_loaded(&self) -> usize {
        self.rows_loaded
    }

    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }
}

impl DataSource for CsvDataSource {
    fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    fn next(&mut self) -> Result<MarketUpdate, DataError> {
        self.inner.next()
    }
}

/// RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn csv_error(err: csv::Error) -> DataError {
    let line = err.position().map_or(0, |p| p.line() as usize);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => DataError::Io(e),
        _ => DataError::Parse { line, reason },
    }
}
