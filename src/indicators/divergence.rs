// =============================================================================
// RSI / MACD-histogram Divergence Detector
// =============================================================================
//
// Scans the trailing `window` bars for local extremes using a symmetric
// `lookback` comparator (a peak is strictly higher than every bar within
// `lookback` on both sides).  The two most recent extremes are compared:
//
//   bearish  price higher-high, indicator lower-high (at the price peaks)
//   bullish  price lower-low,   indicator higher-low (at the price troughs)
//
// Strength:
//   RSI   graded by the RSI level at the second extreme
//         (bearish >= 70 strong, >= 60 moderate; bullish <= 30 / <= 40)
//   MACD  graded by |second / first| histogram ratio (< 0.5 strong, < 0.8
//         moderate)
//
// A divergence is *confirmed* once the indicator has reached its threshold
// (RSI 70 / 30, histogram 0) since the first extreme and is now back through
// it.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::macd::calculate_macd;
use crate::indicators::rsi::{calculate_rsi, RSI_PERIOD};
use crate::market_data::{closes, Candle};
use crate::types::{Strength, Trend};

const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;

/// Extreme-finding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivergenceParams {
    /// Bars on each side a peak/trough must dominate.
    pub lookback: usize,
    /// Trailing bars searched.
    pub window: usize,
}

impl Default for DivergenceParams {
    fn default() -> Self {
        Self {
            lookback: 5,
            window: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    pub kind: Trend,
    pub strength: Strength,
    pub confirmed: bool,
    pub price_first: f64,
    pub price_second: f64,
    pub indicator_first: f64,
    pub indicator_second: f64,
    /// Bars between the second extreme and the latest bar.
    pub bars_ago: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DivergenceResult {
    pub bearish: Option<Divergence>,
    pub bullish: Option<Divergence>,
}

impl DivergenceResult {
    pub fn has_bearish(&self) -> bool {
        self.bearish.is_some()
    }

    pub fn bearish_confirmed(&self) -> bool {
        self.bearish.is_some_and(|d| d.confirmed)
    }

    pub fn strong_bullish(&self) -> bool {
        self.bullish.is_some_and(|d| d.strength == Strength::Strong)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Oscillator {
    Rsi,
    MacdHistogram,
}

/// RSI(14) divergence over the candle window.
pub fn rsi_divergence(candles: &[Candle], params: DivergenceParams) -> DivergenceResult {
    let rsi = calculate_rsi(&closes(candles), RSI_PERIOD);
    detect_rsi_divergence(candles, &rsi, params)
}

/// MACD histogram divergence over the candle window.
pub fn macd_divergence(candles: &[Candle], params: DivergenceParams) -> DivergenceResult {
    let series = calculate_macd(&closes(candles));
    detect_macd_divergence(candles, &series.histogram, params)
}

/// Divergence against a precomputed RSI series aligned with the end of
/// `candles`.
pub fn detect_rsi_divergence(candles: &[Candle], rsi: &[f64], params: DivergenceParams) -> DivergenceResult {
    detect(candles, rsi, params, Oscillator::Rsi)
}

/// Divergence against a precomputed histogram aligned with the end of
/// `candles`.
pub fn detect_macd_divergence(
    candles: &[Candle],
    histogram: &[f64],
    params: DivergenceParams,
) -> DivergenceResult {
    detect(candles, histogram, params, Oscillator::MacdHistogram)
}

fn detect(candles: &[Candle], indicator: &[f64], params: DivergenceParams, osc: Oscillator) -> DivergenceResult {
    let w = params.window.min(candles.len()).min(indicator.len());
    if params.lookback == 0 || w < params.lookback * 2 + 1 {
        return DivergenceResult::default();
    }

    let bars = &candles[candles.len() - w..];
    let ind = &indicator[indicator.len() - w..];
    if ind.iter().any(|v| !v.is_finite()) {
        return DivergenceResult::default();
    }

    let highs: Vec<f64> = bars.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = bars.iter().map(|c| c.low).collect();

    let bearish = last_two(&find_peaks(&highs, params.lookback)).and_then(|(a, b)| {
        (highs[b] > highs[a] && ind[b] < ind[a]).then(|| {
            let confirmed = bearish_confirmed(&ind[a..], osc);
            Divergence {
                kind: Trend::Bearish,
                strength: grade(osc, Trend::Bearish, ind[a], ind[b]),
                confirmed,
                price_first: highs[a],
                price_second: highs[b],
                indicator_first: ind[a],
                indicator_second: ind[b],
                bars_ago: w - 1 - b,
            }
        })
    });

    let bullish = last_two(&find_troughs(&lows, params.lookback)).and_then(|(a, b)| {
        (lows[b] < lows[a] && ind[b] > ind[a]).then(|| {
            let confirmed = bullish_confirmed(&ind[a..], osc);
            Divergence {
                kind: Trend::Bullish,
                strength: grade(osc, Trend::Bullish, ind[a], ind[b]),
                confirmed,
                price_first: lows[a],
                price_second: lows[b],
                indicator_first: ind[a],
                indicator_second: ind[b],
                bars_ago: w - 1 - b,
            }
        })
    });

    DivergenceResult { bearish, bullish }
}

/// Indices strictly greater than every value within `lookback` on both sides.
pub fn find_peaks(values: &[f64], lookback: usize) -> Vec<usize> {
    find_extremes(values, lookback, |centre, other| centre > other)
}

/// Indices strictly lower than every value within `lookback` on both sides.
pub fn find_troughs(values: &[f64], lookback: usize) -> Vec<usize> {
    find_extremes(values, lookback, |centre, other| centre < other)
}

fn find_extremes(values: &[f64], lookback: usize, dominates: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    if lookback == 0 || values.len() < lookback * 2 + 1 {
        return Vec::new();
    }
    (lookback..values.len() - lookback)
        .filter(|&i| {
            (i - lookback..=i + lookback)
                .filter(|&j| j != i)
                .all(|j| dominates(values[i], values[j]))
        })
        .collect()
}

fn last_two(indices: &[usize]) -> Option<(usize, usize)> {
    match indices {
        [.., a, b] => Some((*a, *b)),
        _ => None,
    }
}

fn grade(osc: Oscillator, kind: Trend, first: f64, second: f64) -> Strength {
    match (osc, kind) {
        (Oscillator::Rsi, Trend::Bearish) => {
            if second >= 70.0 {
                Strength::Strong
            } else if second >= 60.0 {
                Strength::Moderate
            } else {
                Strength::Weak
            }
        }
        (Oscillator::Rsi, _) => {
            if second <= 30.0 {
                Strength::Strong
            } else if second <= 40.0 {
                Strength::Moderate
            } else {
                Strength::Weak
            }
        }
        (Oscillator::MacdHistogram, Trend::Bearish) if first > 0.0 => ratio_strength(second / first),
        (Oscillator::MacdHistogram, Trend::Bullish) if first < 0.0 => ratio_strength(second / first),
        (Oscillator::MacdHistogram, _) => Strength::Weak,
    }
}

fn ratio_strength(ratio: f64) -> Strength {
    if !ratio.is_finite() {
        Strength::Weak
    } else if ratio < 0.5 {
        Strength::Strong
    } else if ratio < 0.8 {
        Strength::Moderate
    } else {
        Strength::Weak
    }
}

/// `since_first` starts at the first extreme and ends at the latest bar.
fn bearish_confirmed(since_first: &[f64], osc: Oscillator) -> bool {
    let threshold = match osc {
        Oscillator::Rsi => RSI_OVERBOUGHT,
        Oscillator::MacdHistogram => 0.0,
    };
    let Some(&current) = since_first.last() else {
        return false;
    };
    let reached = since_first.iter().any(|&v| match osc {
        Oscillator::Rsi => v >= threshold,
        Oscillator::MacdHistogram => v > threshold,
    });
    reached && current < threshold
}

fn bullish_confirmed(since_first: &[f64], osc: Oscillator) -> bool {
    let threshold = match osc {
        Oscillator::Rsi => RSI_OVERSOLD,
        Oscillator::MacdHistogram => 0.0,
    };
    let Some(&current) = since_first.last() else {
        return false;
    };
    let reached = since_first.iter().any(|&v| match osc {
        Oscillator::Rsi => v <= threshold,
        Oscillator::MacdHistogram => v < threshold,
    });
    reached && current > threshold
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Flat candles with spikes in the highs (or lows) at the given bars.
    fn candles_with(n: usize, highs: &[(usize, f64)], lows: &[(usize, f64)]) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let high = highs.iter().find(|(j, _)| *j == i).map_or(100.0, |(_, v)| *v);
                let low = lows.iter().find(|(j, _)| *j == i).map_or(98.0, |(_, v)| *v);
                Candle::new(i as i64, 99.0, high, low, 99.0, 10.0)
            })
            .collect()
    }

    fn series_with(n: usize, base: f64, points: &[(usize, f64)]) -> Vec<f64> {
        (0..n)
            .map(|i| points.iter().find(|(j, _)| *j == i).map_or(base, |(_, v)| *v))
            .collect()
    }

    #[test]
    fn default_params() {
        let p = DivergenceParams::default();
        assert_eq!(p.lookback, 5);
        assert_eq!(p.window, 50);
    }

    #[test]
    fn peaks_and_troughs() {
        let values = [1.0, 2.0, 5.0, 2.0, 1.0, 0.0, 1.0, 2.0];
        assert_eq!(find_peaks(&values, 2), vec![2]);
        assert_eq!(find_troughs(&values, 2), vec![5]);
        assert!(find_peaks(&values, 0).is_empty());
    }

    #[test]
    fn short_input_is_empty() {
        let candles = candles_with(5, &[], &[]);
        let r = detect_rsi_divergence(&candles, &[50.0; 5], DivergenceParams::default());
        assert_eq!(r, DivergenceResult::default());
        assert_eq!(rsi_divergence(&[], DivergenceParams::default()), DivergenceResult::default());
    }

    #[test]
    fn confirmed_strong_bearish_rsi() {
        let candles = candles_with(30, &[(10, 110.0), (22, 115.0)], &[]);
        let rsi = series_with(30, 50.0, &[(10, 80.0), (22, 72.0)]);
        let r = detect_rsi_divergence(&candles, &rsi, DivergenceParams::default());
        let d = r.bearish.expect("bearish divergence");
        assert_eq!(d.kind, Trend::Bearish);
        assert_eq!(d.strength, Strength::Strong);
        assert!(d.confirmed);
        assert_eq!(d.bars_ago, 7);
        assert!(r.bullish.is_none());
        assert!(r.bearish_confirmed());
    }

    #[test]
    fn higher_indicator_high_is_not_divergence() {
        let candles = candles_with(30, &[(10, 110.0), (22, 115.0)], &[]);
        let rsi = series_with(30, 50.0, &[(10, 65.0), (22, 75.0)]);
        let r = detect_rsi_divergence(&candles, &rsi, DivergenceParams::default());
        assert!(r.bearish.is_none());
    }

    #[test]
    fn strong_bullish_rsi() {
        let candles = candles_with(30, &[], &[(10, 90.0), (22, 85.0)]);
        let rsi = series_with(30, 50.0, &[(10, 20.0), (22, 28.0)]);
        let r = detect_rsi_divergence(&candles, &rsi, DivergenceParams::default());
        let d = r.bullish.expect("bullish divergence");
        assert_eq!(d.strength, Strength::Strong);
        assert!(d.confirmed);
        assert!(r.strong_bullish());
    }

    #[test]
    fn macd_ratio_grading_and_confirmation() {
        let candles = candles_with(30, &[(10, 110.0), (22, 115.0)], &[]);
        let mut hist = series_with(30, 0.1, &[(10, 2.0), (22, 0.8)]);
        hist[29] = -0.1;
        let r = detect_macd_divergence(&candles, &hist, DivergenceParams::default());
        let d = r.bearish.expect("bearish divergence");
        assert_eq!(d.strength, Strength::Strong);
        assert!(d.confirmed);
    }

    #[test]
    fn window_limits_search() {
        let candles = candles_with(80, &[(10, 110.0), (70, 115.0)], &[]);
        let rsi = series_with(80, 50.0, &[(10, 80.0), (70, 72.0)]);
        let r = detect_rsi_divergence(&candles, &rsi, DivergenceParams::default());
        // First peak sits outside the 50-bar window.
        assert!(r.bearish.is_none());

        let wide = DivergenceParams { lookback: 5, window: 80 };
        assert!(detect_rsi_divergence(&candles, &rsi, wide).bearish.is_some());
    }
}
