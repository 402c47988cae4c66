// =============================================================================
// Exponential Moving Average (EMA) family
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` closes.
//
// The stack used for trend classification is EMA 9 / 21 / 50 / 100 / 200:
//   BULLISH  — EMA9 > EMA21 > EMA50 and price > EMA200
//   BEARISH  — EMA9 < EMA21 < EMA50 and price < EMA200
// The EMA200 term is skipped when fewer than 200 closes are available.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::pct_distance;
use crate::types::{Crossover, Trend};

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// Returns an empty `Vec` when the input is too short or the period is zero.
/// Each output element corresponds to a close starting at index `period - 1`.
///
/// # Edge cases
/// - `period == 0` => empty vec (division by zero guard)
/// - `closes.len() < period` => empty vec
/// - Non-finite intermediate values stop the series.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let sma: f64 = closes[..period].iter().sum::<f64>() / period as f64;
    if !sma.is_finite() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(closes.len() - period + 1);
    result.push(sma);

    let mut prev_ema = sma;
    for &close in &closes[period..] {
        let ema = close * multiplier + prev_ema * (1.0 - multiplier);
        if !ema.is_finite() {
            // Downstream consumers should not trust a broken series.
            break;
        }
        result.push(ema);
        prev_ema = ema;
    }

    result
}

/// Latest value of the `period` EMA, if enough data exists.
pub fn latest_ema(closes: &[f64], period: usize) -> Option<f64> {
    calculate_ema(closes, period).last().copied()
}

/// Snapshot of the EMA stack at the most recent close.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmaResult {
    pub price: f64,
    pub ema9: Option<f64>,
    pub ema21: Option<f64>,
    pub ema50: Option<f64>,
    pub ema100: Option<f64>,
    pub ema200: Option<f64>,
    pub trend: Trend,
    /// EMA9 crossing EMA21 on the last bar.
    pub crossover: Crossover,
}

impl EmaResult {
    /// Percent distance of price above EMA200 (0 when unavailable).
    pub fn ema200_distance_pct(&self) -> f64 {
        self.ema200.map_or(0.0, |e| pct_distance(self.price, e))
    }

    /// Percent spread of EMA9 over EMA50 (0 when unavailable).
    pub fn ema9_ema50_spread_pct(&self) -> f64 {
        match (self.ema9, self.ema50) {
            (Some(fast), Some(slow)) => pct_distance(fast, slow),
            _ => 0.0,
        }
    }
}

/// Build the EMA stack for `closes` and classify its trend.
pub fn analyze_ema(closes: &[f64]) -> EmaResult {
    let Some(&price) = closes.last() else {
        return EmaResult::default();
    };

    let ema9_series = calculate_ema(closes, 9);
    let ema21_series = calculate_ema(closes, 21);

    let ema9 = ema9_series.last().copied();
    let ema21 = ema21_series.last().copied();
    let ema50 = latest_ema(closes, 50);
    let ema100 = latest_ema(closes, 100);
    let ema200 = latest_ema(closes, 200);

    let trend = match (ema9, ema21, ema50) {
        (Some(e9), Some(e21), Some(e50)) => {
            let above_200 = ema200.map_or(true, |e| price > e);
            let below_200 = ema200.map_or(true, |e| price < e);
            if e9 > e21 && e21 > e50 && above_200 {
                Trend::Bullish
            } else if e9 < e21 && e21 < e50 && below_200 {
                Trend::Bearish
            } else {
                Trend::Neutral
            }
        }
        _ => Trend::Neutral,
    };

    // Both series end at the latest close, so their tails are aligned.
    let crossover = if ema9_series.len() >= 2 && ema21_series.len() >= 2 {
        let prev = ema9_series[ema9_series.len() - 2] - ema21_series[ema21_series.len() - 2];
        let curr = ema9_series[ema9_series.len() - 1] - ema21_series[ema21_series.len() - 1];
        Crossover::from_sign_flip(prev, curr)
    } else {
        Crossover::None
    };

    EmaResult {
        price,
        ema9,
        ema21,
        ema50,
        ema100,
        ema200,
        trend,
        crossover,
    }
}
