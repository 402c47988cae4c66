// =============================================================================
// Fake-Pump Detector
// =============================================================================
//
// Seven independent signals that a rally is exhausted rather than supported:
//
//   1. Price far above EMA200          >30% +20, >20% +12
//   2. RSI overbought                  declining +15, otherwise +5
//   3. Upper Bollinger band            rejected +15, closed at/above +10
//   4. Volume fading during advance    +15
//   5. Hesitation after 3 green bars   +10
//   6. Long upper wick, red close      +15
//   7. EMA9 / EMA50 spread             >10% +10, >6% +5
//
// Confidence is the clamped sum; `is_fake` at confidence >= 50.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::bollinger::BollingerResult;
use crate::indicators::ema::EmaResult;
use crate::indicators::rsi::RsiResult;
use crate::market_data::Candle;

pub const FAKE_PUMP_THRESHOLD: f64 = 50.0;

const VOLUME_WINDOW: usize = 3;
const VOLUME_FADE_RATIO: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FakePumpResult {
    pub is_fake: bool,
    /// 0..=100
    pub confidence: f64,
    /// Human-readable description of each signal that fired.
    pub signals: Vec<String>,
}

pub fn detect_fake_pump(
    candles: &[Candle],
    ema: &EmaResult,
    rsi: &RsiResult,
    bb: &BollingerResult,
) -> FakePumpResult {
    let Some(last) = candles.last() else {
        return FakePumpResult::default();
    };

    let mut confidence: f64 = 0.0;
    let mut signals = Vec::new();

    let ema200_dist = ema.ema200_distance_pct();
    if ema200_dist > 30.0 {
        confidence += 20.0;
        signals.push(format!("Price {ema200_dist:.1}% above EMA200"));
    } else if ema200_dist > 20.0 {
        confidence += 12.0;
        signals.push(format!("Price {ema200_dist:.1}% above EMA200"));
    }

    if rsi.value >= 70.0 {
        if rsi.is_declining() {
            confidence += 15.0;
            signals.push(format!("RSI {:.1} overbought and declining", rsi.value));
        } else {
            confidence += 5.0;
            signals.push(format!("RSI {:.1} overbought", rsi.value));
        }
    }

    if bb.upper > 0.0 {
        if last.high >= bb.upper && last.close < bb.upper {
            confidence += 15.0;
            signals.push("Rejected at upper Bollinger band".to_string());
        } else if last.close >= bb.upper {
            confidence += 10.0;
            signals.push("Closed at or above upper Bollinger band".to_string());
        }
    }

    if volume_fading_on_advance(candles) {
        confidence += 15.0;
        signals.push("Volume fading during advance".to_string());
    }

    if hesitation_after_green_run(candles) {
        confidence += 10.0;
        signals.push("Hesitation after 3 green candles".to_string());
    }

    if last.is_bearish() && last.range() > 0.0 && last.upper_wick() >= 0.5 * last.range() {
        confidence += 15.0;
        signals.push("Long upper wick with red close".to_string());
    }

    let spread = ema.ema9_ema50_spread_pct();
    if spread > 10.0 {
        confidence += 10.0;
        signals.push(format!("EMA9/EMA50 spread {spread:.1}%"));
    } else if spread > 6.0 {
        confidence += 5.0;
        signals.push(format!("EMA9/EMA50 spread {spread:.1}%"));
    }

    let confidence = confidence.clamp(0.0, 100.0);
    FakePumpResult {
        is_fake: confidence >= FAKE_PUMP_THRESHOLD,
        confidence,
        signals,
    }
}

/// Price higher than `2 * VOLUME_WINDOW` bars ago while the recent volume
/// average dropped below 70% of the one before it.
fn volume_fading_on_advance(candles: &[Candle]) -> bool {
    let n = candles.len();
    if n < VOLUME_WINDOW * 2 {
        return false;
    }
    let window = &candles[n - VOLUME_WINDOW * 2..];
    let (prior, recent) = window.split_at(VOLUME_WINDOW);

    let advancing = recent[VOLUME_WINDOW - 1].close > prior[0].close;
    let prior_vol = prior.iter().map(|c| c.volume).sum::<f64>() / VOLUME_WINDOW as f64;
    let recent_vol = recent.iter().map(|c| c.volume).sum::<f64>() / VOLUME_WINDOW as f64;

    advancing && prior_vol > 0.0 && recent_vol < prior_vol * VOLUME_FADE_RATIO
}

/// Three green candles followed by a red bar or a body under half their mean.
fn hesitation_after_green_run(candles: &[Candle]) -> bool {
    let n = candles.len();
    if n < 4 {
        return false;
    }
    let run = &candles[n - 4..n - 1];
    if !run.iter().all(Candle::is_bullish) {
        return false;
    }
    let last = &candles[n - 1];
    let mean_body = run.iter().map(Candle::body).sum::<f64>() / 3.0;
    last.is_bearish() || last.body() < 0.5 * mean_body
}
