//! Synthetic bars for testing and development.
//!
//! A simple random walk from a starting price of 100.0, one bar per ticker per
//! weekday. Each ticker draws from its own `StdRng`, seeded from a BLAKE3 hash
//! of the ticker name and the run seed, so adding a ticker never perturbs the
//! others.

use barsim_core::{Bar, DataError, DataSource, MarketUpdate};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct Walk {
    ticker: String,
    rng: StdRng,
    price: f64,
}

impl Walk {
    fn new(ticker: &str, seed: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ticker.as_bytes());
        hasher.update(&seed.to_le_bytes());
        let seed: [u8; 32] = *hasher.finalize().as_bytes();
        Self {
            ticker: ticker.to_string(),
            rng: StdRng::from_seed(seed),
            price: 100.0,
        }
    }

    fn step(&mut self, date: NaiveDate) -> Option<Bar> {
        let daily_return: f64 = self.rng.gen_range(-0.03..0.03);
        let open = self.price;
        let close = open * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + self.rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - self.rng.gen_range(0.0..0.01));
        let volume = self.rng.gen_range(500_000..5_000_000u64) as f64;
        self.price = close;

        Some(Bar {
            ticker: self.ticker.clone(),
            timestamp: date.and_hms_opt(0, 0, 0)?.and_utc(),
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Deterministic random-walk data source.
pub struct SyntheticDataSource {
    walks: Vec<Walk>,
    date: NaiveDate,
    end: Option<NaiveDate>,
    remaining: usize,
}

impl SyntheticDataSource {
    /// `bars` weekday updates starting on the first weekday at or after `start`.
    pub fn new(tickers: &[String], start: NaiveDate, bars: usize, seed: u64) -> Self {
        let mut walks: Vec<Walk> = tickers.iter().map(|t| Walk::new(t, seed)).collect();
        walks.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        walks.dedup_by(|a, b| a.ticker == b.ticker);
        Self {
            walks,
            date: next_weekday(start),
            end: None,
            remaining: bars,
        }
    }

    /// Stop after `end` even if bars remain.
    pub fn with_end(mut self, end: Option<NaiveDate>) -> Self {
        self.end = end;
        self
    }
}

fn next_weekday(mut date: NaiveDate) -> NaiveDate {
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}

impl DataSource for SyntheticDataSource {
    fn has_next(&self) -> bool {
        self.remaining > 0 && !self.walks.is_empty() && self.end.map_or(true, |e| self.date <= e)
    }

    fn next(&mut self) -> Result<MarketUpdate, DataError> {
        if !self.has_next() {
            return Err(DataError::Unavailable("synthetic series exhausted".into()));
        }
        let date = self.date;
        let timestamp = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DataError::Unavailable(format!("invalid date {date}")))?
            .and_utc();

        let mut update = MarketUpdate::new(timestamp);
        for walk in &mut self.walks {
            if let Some(bar) = walk.step(date) {
                update.insert(bar);
            }
        }

        self.remaining -= 1;
        self.date = next_weekday(date + Duration::days(1));
        Ok(update)
    }
}
