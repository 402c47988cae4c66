// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA(12) - EMA(26)
//   Signal    = EMA(9) of MACD
//   Histogram = MACD - Signal
//
// Trend requires the histogram sign and the line-vs-signal ordering to agree.
// Strength compares the current |histogram| with its trailing 9-bar average.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::ema::calculate_ema;
use crate::types::{Crossover, Strength, Trend};

const FAST: usize = 12;
const SLOW: usize = 26;
const SIGNAL: usize = 9;
const STRENGTH_WINDOW: usize = 9;

/// Closes needed for two histogram values (current + previous).
pub const MACD_MIN_CANDLES: usize = SLOW + SIGNAL;

/// Aligned MACD line / signal / histogram series, all ending at the last close.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute the MACD series. Returns empty vectors when data is insufficient.
pub fn calculate_macd(closes: &[f64]) -> MacdSeries {
    let fast = calculate_ema(closes, FAST);
    let slow = calculate_ema(closes, SLOW);
    if slow.is_empty() || fast.len() < slow.len() {
        return MacdSeries::default();
    }

    let offset = fast.len() - slow.len();
    let macd: Vec<f64> = slow
        .iter()
        .enumerate()
        .map(|(i, s)| fast[i + offset] - s)
        .collect();

    let signal = calculate_ema(&macd, SIGNAL);
    if signal.is_empty() {
        return MacdSeries::default();
    }

    // Align the MACD line to the signal series (both end at the last close).
    let macd_tail = macd[macd.len() - signal.len()..].to_vec();
    let histogram = macd_tail
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| m - s)
        .collect();

    MacdSeries {
        macd: macd_tail,
        signal,
        histogram,
    }
}

/// Latest MACD reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub prev_histogram: f64,
    pub trend: Trend,
    pub strength: Strength,
    pub crossover: Crossover,
    /// Positive histogram shrinking toward zero.
    pub weakening: bool,
}

impl Default for MacdResult {
    fn default() -> Self {
        Self {
            macd: 0.0,
            signal: 0.0,
            histogram: 0.0,
            prev_histogram: 0.0,
            trend: Trend::Neutral,
            strength: Strength::Weak,
            crossover: Crossover::None,
            weakening: false,
        }
    }
}

/// MACD(12, 26, 9) of `closes`; neutral when fewer than 35 closes.
pub fn analyze_macd(closes: &[f64]) -> MacdResult {
    if closes.len() < MACD_MIN_CANDLES {
        return MacdResult::default();
    }

    let series = calculate_macd(closes);
    let n = series.histogram.len();
    if n < 2 {
        return MacdResult::default();
    }

    let macd = series.macd[n - 1];
    let signal = series.signal[n - 1];
    let histogram = series.histogram[n - 1];
    let prev_histogram = series.histogram[n - 2];

    let trend = if histogram > 0.0 && macd > signal {
        Trend::Bullish
    } else if histogram < 0.0 && macd < signal {
        Trend::Bearish
    } else {
        Trend::Neutral
    };

    let start = (n - 1).saturating_sub(STRENGTH_WINDOW);
    let trailing = &series.histogram[start..n - 1];
    let avg_abs = trailing.iter().map(|h| h.abs()).sum::<f64>() / trailing.len() as f64;
    let strength = if avg_abs <= f64::EPSILON {
        if histogram.abs() > f64::EPSILON {
            Strength::Strong
        } else {
            Strength::Weak
        }
    } else {
        let ratio = histogram.abs() / avg_abs;
        if ratio >= 1.5 {
            Strength::Strong
        } else if ratio >= 0.75 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    };

    MacdResult {
        macd,
        signal,
        histogram,
        prev_histogram,
        trend,
        strength,
        crossover: Crossover::from_sign_flip(prev_histogram, histogram),
        weakening: histogram > 0.0 && histogram < prev_histogram,
    }
}
