//! Wilder-smoothed indicators over a window of bars.
//!
//! All functions return a series aligned with the input, `NaN` where the
//! lookback is not yet satisfied.

use barsim_core::Bar;

/// True Range series.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let range = bar.high - bar.low;
        let value = match i.checked_sub(1).map(|p| bars[p].close) {
            None => range,
            Some(pc) => range.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
        };
        tr.push(value);
    }
    tr
}

/// Wilder smoothing (EMA with alpha = 1/period), seeded with the mean of the
/// first `period` values.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let mut avg = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = avg;
    let alpha = 1.0 / period as f64;
    for i in period..n {
        avg = alpha * values[i] + (1.0 - alpha) * avg;
        result[i] = avg;
    }
    result
}

/// Average True Range. The seed skips TR[0], so the first value lands at index `period`.
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; bars.len()];
    if bars.len() < 2 {
        return result;
    }
    let tr = true_range(bars);
    let smoothed = wilder_smooth(&tr[1..], period);
    result[1..].copy_from_slice(&smoothed);
    result
}

/// Relative Strength Index on closes.
/// RSI = 100 - 100 / (1 + avg_gain / avg_loss)
/// Edge cases: no movement → 50; avg_loss == 0 → 100; avg_gain == 0 → 0.
pub fn rsi(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();
    let gains: Vec<f64> = changes.iter().map(|c| c.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|c| (-c).max(0.0)).collect();
    let avg_gain = wilder_smooth(&gains, period);
    let avg_loss = wilder_smooth(&losses, period);

    for i in (period - 1)..changes.len() {
        result[i + 1] = compute_rsi(avg_gain[i], avg_loss[i]);
    }
    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Last value of a series, if defined.
pub fn last(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| !v.is_nan())
}
