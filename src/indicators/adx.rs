// =============================================================================
// Average Directional Index (ADX) and Directional Indicators
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = Wilder's smoothed average of DX over `period` bars.
//
// Strength buckets:  ADX >= 25 strong, >= 20 moderate, >= 15 weak, else none.
// Direction:         +DI > -DI bullish, -DI > +DI bearish.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::Candle;
use crate::types::Trend;

pub const ADX_PERIOD: usize = 14;

/// Final smoothed directional readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmiValues {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Compute ADX together with the final +DI / -DI.
///
/// Returns `None` when:
/// - `period` is zero.
/// - There are fewer than `2 * period + 1` candles.
/// - Smoothed true range collapses to zero (no range at all).
/// - Any intermediate calculation produces a non-finite result.
pub fn calculate_dmi(candles: &[Candle], period: usize) -> Option<DmiValues> {
    if period == 0 {
        return None;
    }

    // `period` bars to seed +DM/-DM/TR, `period` DX values to seed ADX, plus
    // the very first candle that has no predecessor.
    let min_candles = 2 * period + 1;
    if candles.len() < min_candles {
        return None;
    }

    let period_f = period as f64;

    // ------------------------------------------------------------------
    // Step 1 & 2: Raw +DM, -DM, and True Range for each consecutive pair
    // ------------------------------------------------------------------
    let bar_count = candles.len() - 1;

    let mut plus_dm = Vec::with_capacity(bar_count);
    let mut minus_dm = Vec::with_capacity(bar_count);
    let mut tr_vals = Vec::with_capacity(bar_count);

    for pair in candles.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);

        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;

        plus_dm.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dm.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });
        tr_vals.push(cur.true_range(prev.close));
    }

    // ------------------------------------------------------------------
    // Step 3: Wilder's smoothing of +DM, -DM, TR
    // ------------------------------------------------------------------
    let mut smooth_plus_dm: f64 = plus_dm[..period].iter().sum();
    let mut smooth_minus_dm: f64 = minus_dm[..period].iter().sum();
    let mut smooth_tr: f64 = tr_vals[..period].iter().sum();

    let mut dx_values: Vec<f64> = Vec::with_capacity(bar_count - period + 1);
    let (mut dx, mut plus_di, mut minus_di) =
        compute_dx(smooth_plus_dm, smooth_minus_dm, smooth_tr)?;
    dx_values.push(dx);

    for i in period..bar_count {
        smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / period_f + plus_dm[i];
        smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / period_f + minus_dm[i];
        smooth_tr = smooth_tr - smooth_tr / period_f + tr_vals[i];

        (dx, plus_di, minus_di) = compute_dx(smooth_plus_dm, smooth_minus_dm, smooth_tr)?;
        dx_values.push(dx);
    }

    // ------------------------------------------------------------------
    // Step 6: ADX = Wilder's smoothed average of DX
    // ------------------------------------------------------------------
    if dx_values.len() < period {
        return None;
    }

    let mut adx: f64 = dx_values[..period].iter().sum::<f64>() / period_f;
    for &dx in &dx_values[period..] {
        adx = (adx * (period_f - 1.0) + dx) / period_f;
    }

    if adx.is_finite() {
        Some(DmiValues {
            adx,
            plus_di,
            minus_di,
        })
    } else {
        None
    }
}

/// Compute only the most recent ADX value.
pub fn calculate_adx(candles: &[Candle], period: usize) -> Option<f64> {
    calculate_dmi(candles, period).map(|d| d.adx)
}

/// ADX trend-strength bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStrength {
    None,
    Weak,
    Moderate,
    Strong,
}

impl TrendStrength {
    pub fn from_adx(adx: f64) -> Self {
        if adx >= 25.0 {
            Self::Strong
        } else if adx >= 20.0 {
            Self::Moderate
        } else if adx >= 15.0 {
            Self::Weak
        } else {
            Self::None
        }
    }
}

/// Latest ADX / DI reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxResult {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub trend_strength: TrendStrength,
    pub signal: Trend,
}

impl Default for AdxResult {
    fn default() -> Self {
        Self {
            adx: 0.0,
            plus_di: 0.0,
            minus_di: 0.0,
            trend_strength: TrendStrength::None,
            signal: Trend::Neutral,
        }
    }
}

/// ADX(14) analysis; strength "none" when it cannot be computed.
pub fn analyze_adx(candles: &[Candle]) -> AdxResult {
    let Some(dmi) = calculate_dmi(candles, ADX_PERIOD) else {
        return AdxResult::default();
    };

    let signal = if dmi.plus_di > dmi.minus_di {
        Trend::Bullish
    } else if dmi.minus_di > dmi.plus_di {
        Trend::Bearish
    } else {
        Trend::Neutral
    };

    AdxResult {
        adx: dmi.adx,
        plus_di: dmi.plus_di,
        minus_di: dmi.minus_di,
        trend_strength: TrendStrength::from_adx(dmi.adx),
        signal,
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Compute (DX, +DI, -DI) from smoothed +DM, -DM, and TR values.
fn compute_dx(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> Option<(f64, f64, f64)> {
    if smooth_tr == 0.0 {
        return None;
    }

    let plus_di = (smooth_plus_dm / smooth_tr) * 100.0;
    let minus_di = (smooth_minus_dm / smooth_tr) * 100.0;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        // No directional movement.
        return Some((0.0, plus_di, minus_di));
    }

    let dx = ((plus_di - minus_di).abs() / di_sum) * 100.0;

    if dx.is_finite() {
        Some((dx, plus_di, minus_di))
    } else {
        None
    }
}
