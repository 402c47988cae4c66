// =============================================================================
// Average True Range (ATR) — mean true range
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the arithmetic mean of the last `period` TR values; ATR% expresses
// it relative to the latest close so assets at different price scales compare.
//
// Default period: 14
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::Candle;

pub const ATR_PERIOD: usize = 14;

/// Mean true range over the last `period` bars.
///
/// # Returns
/// `None` when:
/// - `period` is zero.
/// - There are fewer than `period + 1` candles (each TR needs a previous
///   close).
/// - The mean is non-finite.
pub fn calculate_atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let tail = &candles[candles.len() - period - 1..];
    let sum: f64 = tail
        .windows(2)
        .map(|w| w[1].true_range(w[0].close))
        .sum();
    let atr = sum / period as f64;

    if atr.is_finite() {
        Some(atr)
    } else {
        None
    }
}

/// Calculate ATR as a percentage of the current price.
pub fn calculate_atr_pct(candles: &[Candle], period: usize) -> Option<f64> {
    let atr = calculate_atr(candles, period)?;
    let last_close = candles.last()?.close;
    if last_close == 0.0 {
        return None;
    }
    let pct = (atr / last_close) * 100.0;
    pct.is_finite().then_some(pct)
}

/// ATR% over up to `window` bars, shrinking the window to what is available.
///
/// Returns 0.0 for fewer than two candles or a zero price.
pub fn atr_pct_over(candles: &[Candle], window: usize) -> f64 {
    if candles.len() < 2 || window == 0 {
        return 0.0;
    }
    let period = window.min(candles.len() - 1);
    calculate_atr_pct(candles, period).unwrap_or(0.0)
}

/// Latest ATR reading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AtrResult {
    pub value: f64,
    pub percent: f64,
}

/// ATR(14); zeros when it cannot be computed.
pub fn analyze_atr(candles: &[Candle]) -> AtrResult {
    let Some(value) = calculate_atr(candles, ATR_PERIOD) else {
        return AtrResult::default();
    };
    AtrResult {
        value,
        percent: calculate_atr_pct(candles, ATR_PERIOD).unwrap_or(0.0),
    }
}
