// =============================================================================
// Entry Timing — is *now* a good moment to open the short?
// =============================================================================
//
// Computed on the fastest timeframe only and kept out of the composite score;
// it feeds the confidence multiplier and the report.
//
//   pattern         0..20  candlestick score, -15 on a strong bullish pattern
//   indicators      0..35  RSI level, StochRSI cross, MACD state, divergence
//   volume          0..25  volume spike + selling pressure (last 5 candles)
//   price position  0..20  Bollinger position, EMA200 stretch, upper wick
//
// State machine on the total (default cut-offs, see `EntryTimingThresholds`):
//   >= 70  enter_now / optimal
//   >= 55  ready     / good
//   >= 40  wait      / early  (5-15 min)
//   else   wait      / late   (15-30 min)

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alt_config::{AltConfig, EntryTimingThresholds};
use crate::indicators::Indicators;
use crate::market_data::{closed_candles, Candle, Timeframe, TimeframeCandles};
use crate::types::{Crossover, OscillatorZone, Trend};

const PATTERN_MAX: f64 = 20.0;
const INDICATOR_MAX: f64 = 35.0;
const VOLUME_MAX: f64 = 25.0;
const POSITION_MAX: f64 = 20.0;

const BULLISH_CONTRADICTION: f64 = 15.0;
const PRESSURE_WINDOW: usize = 5;
/// Selling pressure reported when the window has bearish volume only.
const PRESSURE_CAP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySignal {
    EnterNow,
    Ready,
    Wait,
}

impl std::fmt::Display for EntrySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnterNow => write!(f, "ENTER_NOW"),
            Self::Ready => write!(f, "READY"),
            Self::Wait => write!(f, "WAIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryQuality {
    Optimal,
    Good,
    Early,
    Late,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryTiming {
    pub total: f64,
    pub pattern_score: f64,
    pub indicator_score: f64,
    pub volume_score: f64,
    pub price_position_score: f64,
    pub signal: EntrySignal,
    pub quality: EntryQuality,
    /// Suggested wait in minutes (min, max) when not entering now.
    pub suggested_delay_minutes: Option<(u32, u32)>,
    pub timeframe: Option<Timeframe>,
    pub reasons: Vec<String>,
}

impl Default for EntryTiming {
    fn default() -> Self {
        Self {
            total: 0.0,
            pattern_score: 0.0,
            indicator_score: 0.0,
            volume_score: 0.0,
            price_position_score: 0.0,
            signal: EntrySignal::Wait,
            quality: EntryQuality::Late,
            suggested_delay_minutes: Some((15, 30)),
            timeframe: None,
            reasons: Vec::new(),
        }
    }
}

/// Entry timing on the fastest timeframe present in `candles`.
pub fn analyze(symbol: &str, candles: &TimeframeCandles, cfg: &AltConfig) -> EntryTiming {
    let (timeframe, series) = candles.fastest();
    if series.is_empty() {
        return EntryTiming::default();
    }
    let indicators = Indicators::from_candles(series);
    let mut timing = evaluate(&indicators, series, cfg);
    timing.timeframe = timeframe;

    debug!(
        symbol,
        timeframe = timeframe.map_or("none", |tf| tf.label()),
        total = format!("{:.1}", timing.total),
        signal = %timing.signal,
        "entry timing computed"
    );
    timing
}

/// Score entry timing from indicators already computed over `candles`.
pub fn evaluate(ind: &Indicators, candles: &[Candle], cfg: &AltConfig) -> EntryTiming {
    let t = &cfg.entry_timing;
    let volume = &cfg.volume;
    let mut reasons = Vec::new();

    // --- Pattern -----------------------------------------------------------
    let mut pattern_score = ind.patterns.score;
    if let Some(p) = ind.patterns.strongest() {
        reasons.push(format!("Pattern: {p}"));
    }
    if ind.patterns.has_high_reliability_bullish() {
        pattern_score -= BULLISH_CONTRADICTION;
        reasons.push("Strong bullish pattern contradicts short".to_string());
    }
    let pattern_score = pattern_score.clamp(0.0, PATTERN_MAX);

    // --- Indicators --------------------------------------------------------
    let mut indicator_score: f64 = 0.0;
    let rsi = ind.rsi.value;
    indicator_score += if rsi >= t.rsi_extreme {
        12.0
    } else if rsi >= t.rsi_strong {
        9.0
    } else if rsi >= t.rsi_elevated {
        5.0
    } else if rsi >= t.rsi_warm {
        2.0
    } else {
        0.0
    };

    let stoch = &ind.stoch_rsi;
    if stoch.cross == Crossover::Bearish && stoch.d >= t.stoch_cross_from {
        indicator_score += 8.0;
        reasons.push("StochRSI bearish cross from overbought".to_string());
    } else if stoch.zone == OscillatorZone::Overbought {
        indicator_score += 5.0;
    } else if stoch.k < stoch.d {
        indicator_score += 2.0;
    }

    if ind.macd.crossover == Crossover::Bearish {
        indicator_score += 8.0;
        reasons.push("MACD bearish crossover".to_string());
    } else if ind.macd.trend == Trend::Bearish {
        indicator_score += 6.0;
    } else if ind.macd.weakening {
        indicator_score += 4.0;
    }

    if ind.rsi_divergence.has_bearish() {
        indicator_score += 7.0;
        reasons.push("RSI bearish divergence".to_string());
    }
    let indicator_score = indicator_score.clamp(0.0, INDICATOR_MAX);

    // --- Volume ------------------------------------------------------------
    let mut volume_score: f64 = 0.0;
    let ratio = ind.volume_ratio;
    if ratio >= volume.spike {
        volume_score += 12.0;
        reasons.push(format!("Volume spike {ratio:.1}x"));
    } else if ratio >= volume.high {
        volume_score += 8.0;
    } else if ratio >= volume.elevated {
        volume_score += 4.0;
    }

    let pressure = selling_pressure(candles);
    volume_score += if pressure >= t.pressure_heavy {
        13.0
    } else if pressure >= t.pressure_high {
        9.0
    } else if pressure >= t.pressure_balanced {
        4.0
    } else {
        0.0
    };
    let volume_score = volume_score.clamp(0.0, VOLUME_MAX);

    // --- Price position ----------------------------------------------------
    let mut price_position_score: f64 = 0.0;
    let bb = ind.bollinger.position;
    price_position_score += if bb >= t.bollinger_extreme {
        8.0
    } else if bb >= t.bollinger_high {
        5.0
    } else if bb >= t.bollinger_elevated {
        2.0
    } else {
        0.0
    };

    let ema200_dist = ind.ema.ema200_distance_pct();
    price_position_score += if ema200_dist >= t.ema200_far {
        4.0
    } else if ema200_dist >= t.ema200_stretched {
        2.0
    } else {
        0.0
    };

    let wick = upper_wick_share(candles);
    if wick >= t.wick_rejection {
        price_position_score += 8.0;
        reasons.push(format!("Upper wick rejection {:.0}%", wick * 100.0));
    } else if wick >= t.wick_strong {
        price_position_score += 5.0;
    } else if wick >= t.wick_visible {
        price_position_score += 2.0;
    }
    let price_position_score = price_position_score.clamp(0.0, POSITION_MAX);

    let total = (pattern_score + indicator_score + volume_score + price_position_score).clamp(0.0, 100.0);
    let (signal, quality, suggested_delay_minutes) = classify(total, t);

    EntryTiming {
        total,
        pattern_score,
        indicator_score,
        volume_score,
        price_position_score,
        signal,
        quality,
        suggested_delay_minutes,
        timeframe: None,
        reasons,
    }
}

fn classify(total: f64, t: &EntryTimingThresholds) -> (EntrySignal, EntryQuality, Option<(u32, u32)>) {
    if total >= t.enter_now {
        (EntrySignal::EnterNow, EntryQuality::Optimal, None)
    } else if total >= t.ready {
        (EntrySignal::Ready, EntryQuality::Good, None)
    } else if total >= t.early {
        (EntrySignal::Wait, EntryQuality::Early, Some((5, 15)))
    } else {
        (EntrySignal::Wait, EntryQuality::Late, Some((15, 30)))
    }
}

/// Bearish-candle volume over bullish-candle volume across the last five
/// candles.
pub fn selling_pressure(candles: &[Candle]) -> f64 {
    let tail = &candles[candles.len().saturating_sub(PRESSURE_WINDOW)..];
    let (bear, bull) = tail.iter().fold((0.0, 0.0), |(bear, bull), c| {
        if c.is_bearish() {
            (bear + c.volume, bull)
        } else if c.is_bullish() {
            (bear, bull + c.volume)
        } else {
            (bear, bull)
        }
    });
    if bull <= 0.0 {
        return if bear > 0.0 { PRESSURE_CAP } else { 0.0 };
    }
    let ratio: f64 = bear / bull;
    if ratio.is_finite() {
        ratio.min(PRESSURE_CAP)
    } else {
        0.0
    }
}

/// Upper wick as a fraction of range on the last closed candle.
fn upper_wick_share(candles: &[Candle]) -> f64 {
    let closed = closed_candles(candles);
    let Some(last) = closed.last() else {
        return 0.0;
    };
    let range = last.range();
    if range > 0.0 && range.is_finite() {
        (last.upper_wick() / range).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
