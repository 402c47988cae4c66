// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Running sum of signed volume:
//   close > prev close  =>  OBV += volume
//   close < prev close  =>  OBV -= volume
//   otherwise           =>  unchanged
//
// Divergence compares the most recent 14-bar window with the 14 bars before
// it: a higher price high with a lower OBV high is bearish, a lower price low
// with a higher OBV low is bullish.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::Candle;
use crate::types::Trend;

const OBV_WINDOW: usize = 14;

/// OBV series, one value per candle (first value is 0).
pub fn calculate_obv(candles: &[Candle]) -> Vec<f64> {
    let mut result = Vec::with_capacity(candles.len());
    let mut obv = 0.0_f64;
    for (i, candle) in candles.iter().enumerate() {
        if i > 0 {
            let prev_close = candles[i - 1].close;
            if candle.close > prev_close {
                obv += candle.volume;
            } else if candle.close < prev_close {
                obv -= candle.volume;
            }
        }
        result.push(obv);
    }
    result
}

/// Latest OBV reading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObvResult {
    pub value: f64,
    /// Direction of OBV over the last 14 bars.
    pub trend: Trend,
    /// `Neutral` when no divergence is present.
    pub divergence: Trend,
}

pub fn analyze_obv(candles: &[Candle]) -> ObvResult {
    if candles.len() < 2 {
        return ObvResult::default();
    }

    let series = calculate_obv(candles);
    let n = series.len();
    let value = series[n - 1];
    if !value.is_finite() {
        return ObvResult::default();
    }

    let trend = if n > OBV_WINDOW {
        let delta = value - series[n - 1 - OBV_WINDOW];
        if delta > 0.0 {
            Trend::Bullish
        } else if delta < 0.0 {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    } else {
        Trend::Neutral
    };

    ObvResult {
        value,
        trend,
        divergence: window_divergence(candles, &series),
    }
}

fn window_divergence(candles: &[Candle], obv: &[f64]) -> Trend {
    let n = candles.len();
    if n < OBV_WINDOW * 2 {
        return Trend::Neutral;
    }

    let recent = n - OBV_WINDOW..n;
    let prior = n - 2 * OBV_WINDOW..n - OBV_WINDOW;

    let price_hi_recent = fold_max(candles[recent.clone()].iter().map(|c| c.high));
    let price_hi_prior = fold_max(candles[prior.clone()].iter().map(|c| c.high));
    let obv_hi_recent = fold_max(obv[recent.clone()].iter().copied());
    let obv_hi_prior = fold_max(obv[prior.clone()].iter().copied());

    if price_hi_recent > price_hi_prior && obv_hi_recent < obv_hi_prior {
        return Trend::Bearish;
    }

    let price_lo_recent = fold_min(candles[recent.clone()].iter().map(|c| c.low));
    let price_lo_prior = fold_min(candles[prior.clone()].iter().map(|c| c.low));
    let obv_lo_recent = fold_min(obv[recent].iter().copied());
    let obv_lo_prior = fold_min(obv[prior].iter().copied());

    if price_lo_recent < price_lo_prior && obv_lo_recent > obv_lo_prior {
        return Trend::Bullish;
    }

    Trend::Neutral
}

fn fold_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::MIN, f64::max)
}

fn fold_min(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::MAX, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(close: f64, volume: f64) -> Candle {
        Candle::new(0, close, close + 1.0, close - 1.0, close, volume)
    }

    #[test]
    fn obv_signed_volume() {
        let candles = vec![candle(10.0, 5.0), candle(11.0, 7.0), candle(10.5, 3.0), candle(10.5, 9.0)];
        assert_eq!(calculate_obv(&candles), vec![0.0, 7.0, 4.0, 4.0]);
    }

    #[test]
    fn obv_short_input_is_default() {
        assert_eq!(analyze_obv(&[]), ObvResult::default());
        assert_eq!(analyze_obv(&[candle(1.0, 1.0)]), ObvResult::default());
    }

    #[test]
    fn obv_rising_trend() {
        let candles: Vec<Candle> = (0..30).map(|i| candle(100.0 + i as f64, 10.0)).collect();
        let r = analyze_obv(&candles);
        assert_eq!(r.trend, Trend::Bullish);
        assert_eq!(r.divergence, Trend::Neutral);
    }

    #[test]
    fn obv_bearish_divergence() {
        // Prior window: strong rise on heavy volume.
        let mut candles: Vec<Candle> = (0..14).map(|i| candle(100.0 + i as f64, 100.0)).collect();
        // Recent window: drop on heavy volume, then a thin-volume push to a
        // marginal new high.
        for i in 0..7 {
            candles.push(candle(112.0 - i as f64, 150.0));
        }
        for i in 0..7 {
            candles.push(candle(106.0 + i as f64 * 1.5, 5.0));
        }
        let r = analyze_obv(&candles);
        assert_eq!(r.divergence, Trend::Bearish);
    }

    #[test]
    fn obv_zero_volume_is_finite() {
        let candles: Vec<Candle> = (0..40).map(|i| candle(100.0 + i as f64, 0.0)).collect();
        let r = analyze_obv(&candles);
        assert_eq!(r.value, 0.0);
        assert_eq!(r.trend, Trend::Neutral);
    }
}
