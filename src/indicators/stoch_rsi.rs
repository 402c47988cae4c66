// =============================================================================
// Stochastic RSI
// =============================================================================
//
//   K = (RSI - min(RSI, 14)) / (max(RSI, 14) - min(RSI, 14)) * 100
//   D = SMA(K, 3)
//
// K >= 80 => OVERBOUGHT, K <= 20 => OVERSOLD.  A flat RSI window (max == min)
// yields K = 50.

use serde::{Deserialize, Serialize};

use crate::indicators::rsi::{calculate_rsi, RSI_PERIOD};
use crate::types::{Crossover, OscillatorZone};

const STOCH_PERIOD: usize = 14;
const D_PERIOD: usize = 3;

/// Closes needed for a current and a previous K/D pair.
pub const STOCH_RSI_MIN_CANDLES: usize = RSI_PERIOD + STOCH_PERIOD + D_PERIOD;

/// Latest StochRSI reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochRsiResult {
    pub k: f64,
    pub d: f64,
    pub zone: OscillatorZone,
    /// K crossing D on the last bar.
    pub cross: Crossover,
}

impl Default for StochRsiResult {
    fn default() -> Self {
        Self {
            k: 50.0,
            d: 50.0,
            zone: OscillatorZone::Neutral,
            cross: Crossover::None,
        }
    }
}

/// K series of the stochastic applied to RSI values.
pub fn calculate_stoch_k(closes: &[f64]) -> Vec<f64> {
    let rsi = calculate_rsi(closes, RSI_PERIOD);
    if rsi.len() < STOCH_PERIOD {
        return Vec::new();
    }
    rsi.windows(STOCH_PERIOD)
        .map(|w| {
            let lo = w.iter().copied().fold(f64::MAX, f64::min);
            let hi = w.iter().copied().fold(f64::MIN, f64::max);
            let last = w[w.len() - 1];
            if hi - lo <= f64::EPSILON {
                50.0
            } else {
                (last - lo) / (hi - lo) * 100.0
            }
        })
        .collect()
}

pub fn analyze_stoch_rsi(closes: &[f64]) -> StochRsiResult {
    if closes.len() < STOCH_RSI_MIN_CANDLES {
        return StochRsiResult::default();
    }

    let k_series = calculate_stoch_k(closes);
    if k_series.len() < D_PERIOD + 1 {
        return StochRsiResult::default();
    }

    let d_series: Vec<f64> = k_series
        .windows(D_PERIOD)
        .map(|w| w.iter().sum::<f64>() / D_PERIOD as f64)
        .collect();

    let k = k_series[k_series.len() - 1];
    let prev_k = k_series[k_series.len() - 2];
    let d = d_series[d_series.len() - 1];
    let prev_d = d_series[d_series.len() - 2];

    let zone = if k >= 80.0 {
        OscillatorZone::Overbought
    } else if k <= 20.0 {
        OscillatorZone::Oversold
    } else {
        OscillatorZone::Neutral
    };

    StochRsiResult {
        k,
        d,
        zone,
        cross: Crossover::from_sign_flip(prev_k - prev_d, k - d),
    }
}
