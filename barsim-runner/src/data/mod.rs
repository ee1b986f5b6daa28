//! Data sources feeding the engine.
//!
//! - [`CsvDataSource`]: long-format CSV file, grouped by timestamp
//! - [`VecDataSource`]: in-memory updates
//! - [`SyntheticDataSource`]: seeded random walk, for development and tests

pub mod csv;
pub mod memory;
pub mod synthetic;

pub use self::csv::CsvDataSource;
pub use memory::VecDataSource;
pub use synthetic::SyntheticDataSource;

use chrono::{DateTime, NaiveDate, Utc};

/// Inclusive calendar-date window. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.contains_date(ts.date_naive())
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}
