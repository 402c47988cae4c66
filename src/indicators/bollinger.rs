// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ). The Band Width (BBW) is the normalised
// distance: BBW = (upper - lower) / middle * 100.
//
// Position locates the close inside the envelope:
//   position = (close - lower) / (upper - lower) * 100
// A squeeze is flagged when the current BBW is below 0.7x the mean BBW of the
// 20 preceding windows.

use serde::{Deserialize, Serialize};

use crate::market_data::finite_or;
use crate::types::OscillatorZone;

pub const BB_PERIOD: usize = 20;
pub const BB_STD: f64 = 2.0;
const SQUEEZE_LOOKBACK: usize = 20;
const SQUEEZE_RATIO: f64 = 0.7;

/// Raw band levels for one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
}

/// Calculate Bollinger Bands over the last `period` closes.
///
/// Returns `None` when:
/// - Fewer than `period` data points.
/// - Middle band is zero (degenerate input).
/// - The width is non-finite.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Option<BollingerBands> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;

    if middle == 0.0 {
        return None;
    }

    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    let upper = middle + num_std * std_dev;
    let lower = middle - num_std * std_dev;
    let width = (upper - lower) / middle * 100.0;

    if width.is_finite() {
        Some(BollingerBands {
            upper,
            middle,
            lower,
            width,
        })
    } else {
        None
    }
}

/// Bollinger reading at the latest close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
    /// Percent location of the close in [lower, upper]; may leave 0..100 when
    /// price trades outside the bands.
    pub position: f64,
    pub squeeze: bool,
    pub signal: OscillatorZone,
}

impl Default for BollingerResult {
    fn default() -> Self {
        Self {
            upper: 0.0,
            middle: 0.0,
            lower: 0.0,
            width: 0.0,
            position: 50.0,
            squeeze: false,
            signal: OscillatorZone::Neutral,
        }
    }
}

/// BB(20, 2) analysis; position 50 when the bands cannot be built or have
/// zero width.
pub fn analyze_bollinger(closes: &[f64]) -> BollingerResult {
    let Some(bands) = calculate_bollinger(closes, BB_PERIOD, BB_STD) else {
        return BollingerResult::default();
    };
    let Some(&close) = closes.last() else {
        return BollingerResult::default();
    };

    let span = bands.upper - bands.lower;
    let position = if span > f64::EPSILON {
        finite_or((close - bands.lower) / span * 100.0, 50.0)
    } else {
        50.0
    };

    let squeeze = trailing_mean_width(closes)
        .is_some_and(|avg| avg > 0.0 && bands.width < avg * SQUEEZE_RATIO);

    let signal = if position > 90.0 {
        OscillatorZone::Overbought
    } else if position < 10.0 {
        OscillatorZone::Oversold
    } else {
        OscillatorZone::Neutral
    };

    BollingerResult {
        upper: bands.upper,
        middle: bands.middle,
        lower: bands.lower,
        width: bands.width,
        position,
        squeeze,
        signal,
    }
}

/// Mean band width of the `SQUEEZE_LOOKBACK` windows before the latest one.
fn trailing_mean_width(closes: &[f64]) -> Option<f64> {
    if closes.len() < BB_PERIOD + SQUEEZE_LOOKBACK {
        return None;
    }
    let n = closes.len();
    let mut sum = 0.0;
    for k in 1..=SQUEEZE_LOOKBACK {
        sum += calculate_bollinger(&closes[..n - k], BB_PERIOD, BB_STD)?.width;
    }
    Some(sum / SQUEEZE_LOOKBACK as f64)
}
