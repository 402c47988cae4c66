// =============================================================================
// Candlestick Pattern Detector
// =============================================================================
//
// Looks only at the last three *closed* candles (c1 oldest, c3 newest).  The
// forming bar is ignored so a pattern cannot appear and vanish intrabar.
//
// Bearish patterns carry a reliability grade and a fixed point value:
//
//   HIGH    engulfing 8, evening star 8, three black crows 8
//   MEDIUM  shooting star 6, dark cloud cover 6, gravestone doji 5,
//           wick rejection 5
//   LOW     harami 4, belt-hold 4, tweezer top 4
//
// Two patterns add +3, three or more add +5; the total is capped at 20.
// Bullish patterns are detected alongside and only serve as a contradiction
// warning for the short side.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::{closed_candles, Candle};

const MAX_PATTERN_SCORE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reliability {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BearishPattern {
    Engulfing,
    EveningStar,
    ThreeBlackCrows,
    ShootingStar,
    DarkCloudCover,
    GravestoneDoji,
    WickRejection,
    Harami,
    BeltHold,
    TweezerTop,
}

impl BearishPattern {
    pub fn reliability(self) -> Reliability {
        match self {
            Self::Engulfing | Self::EveningStar | Self::ThreeBlackCrows => Reliability::High,
            Self::ShootingStar | Self::DarkCloudCover | Self::GravestoneDoji | Self::WickRejection => {
                Reliability::Medium
            }
            Self::Harami | Self::BeltHold | Self::TweezerTop => Reliability::Low,
        }
    }

    pub fn points(self) -> f64 {
        match self {
            Self::Engulfing | Self::EveningStar | Self::ThreeBlackCrows => 8.0,
            Self::ShootingStar | Self::DarkCloudCover => 6.0,
            Self::GravestoneDoji | Self::WickRejection => 5.0,
            Self::Harami | Self::BeltHold | Self::TweezerTop => 4.0,
        }
    }
}

impl std::fmt::Display for BearishPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Engulfing => "Bearish Engulfing",
            Self::EveningStar => "Evening Star",
            Self::ThreeBlackCrows => "Three Black Crows",
            Self::ShootingStar => "Shooting Star",
            Self::DarkCloudCover => "Dark Cloud Cover",
            Self::GravestoneDoji => "Gravestone Doji",
            Self::WickRejection => "Wick Rejection",
            Self::Harami => "Bearish Harami",
            Self::BeltHold => "Bearish Belt-Hold",
            Self::TweezerTop => "Tweezer Top",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BullishPattern {
    Engulfing,
    Hammer,
    MorningStar,
    PiercingLine,
    ThreeWhiteSoldiers,
    Harami,
}

impl BullishPattern {
    pub fn reliability(self) -> Reliability {
        match self {
            Self::Engulfing | Self::MorningStar | Self::ThreeWhiteSoldiers => Reliability::High,
            Self::Hammer | Self::PiercingLine => Reliability::Medium,
            Self::Harami => Reliability::Low,
        }
    }
}

/// Patterns found on the last three closed candles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub bearish: Vec<BearishPattern>,
    pub bullish: Vec<BullishPattern>,
    /// Bearish points plus multi-pattern bonus, 0..=20.
    pub score: f64,
}

impl PatternAnalysis {
    pub fn has_bearish(&self) -> bool {
        !self.bearish.is_empty()
    }

    pub fn has_high_reliability_bearish(&self) -> bool {
        self.bearish.iter().any(|p| p.reliability() == Reliability::High)
    }

    /// A strong bullish pattern contradicts a short entry.
    pub fn has_high_reliability_bullish(&self) -> bool {
        self.bullish.iter().any(|p| p.reliability() == Reliability::High)
    }

    /// Highest-scoring bearish pattern.
    pub fn strongest(&self) -> Option<BearishPattern> {
        self.bearish
            .iter()
            .copied()
            .max_by(|a, b| a.points().total_cmp(&b.points()))
    }
}

/// Sum of points plus the multi-pattern bonus, capped.
pub fn score_patterns(patterns: &[BearishPattern]) -> f64 {
    let base: f64 = patterns.iter().map(|p| p.points()).sum();
    let bonus = match patterns.len() {
        0 | 1 => 0.0,
        2 => 3.0,
        _ => 5.0,
    };
    (base + bonus).min(MAX_PATTERN_SCORE)
}

pub fn detect_patterns(candles: &[Candle]) -> PatternAnalysis {
    let closed = closed_candles(candles);
    if closed.len() < 3 {
        return PatternAnalysis::default();
    }
    let tail = &closed[closed.len() - 3..];
    let (c1, c2, c3) = (&tail[0], &tail[1], &tail[2]);
    if [c1, c2, c3].iter().any(|c| !is_valid(c)) {
        return PatternAnalysis::default();
    }

    let bearish = detect_bearish(c1, c2, c3);
    let bullish = detect_bullish(c1, c2, c3);
    let score = score_patterns(&bearish);

    PatternAnalysis {
        bearish,
        bullish,
        score,
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn is_valid(c: &Candle) -> bool {
    [c.open, c.high, c.low, c.close].iter().all(|v| v.is_finite()) && c.high >= c.low
}

fn detect_bearish(c1: &Candle, c2: &Candle, c3: &Candle) -> Vec<BearishPattern> {
    let mut found = Vec::new();
    let range = c3.range();

    if c2.is_bullish()
        && c3.is_bearish()
        && c3.open >= c2.close
        && c3.close <= c2.open
        && c3.body() > c2.body()
    {
        found.push(BearishPattern::Engulfing);
    }

    if c1.is_bullish()
        && c1.range() > 0.0
        && c1.body() >= 0.6 * c1.range()
        && c2.body() <= 0.3 * c1.body()
        && c2.open.min(c2.close) >= c1.body_mid()
        && c3.is_bearish()
        && c3.close < c1.body_mid()
    {
        found.push(BearishPattern::EveningStar);
    }

    if [c1, c2, c3].iter().all(|c| c.is_bearish() && c.range() > 0.0 && c.body() >= 0.5 * c.range())
        && c2.close < c1.close
        && c3.close < c2.close
        && c2.open <= c1.open
        && c2.open >= c1.close
        && c3.open <= c2.open
        && c3.open >= c2.close
    {
        found.push(BearishPattern::ThreeBlackCrows);
    }

    if range > 0.0
        && c3.upper_wick() >= 2.0 * c3.body()
        && c3.lower_wick() <= 0.15 * range
        && c2.close > c1.close
    {
        found.push(BearishPattern::ShootingStar);
    }

    if c2.is_bullish()
        && c3.is_bearish()
        && c3.open >= c2.close
        && c3.close < c2.body_mid()
        && c3.close > c2.open
    {
        found.push(BearishPattern::DarkCloudCover);
    }

    if range > 0.0
        && c3.body() <= 0.1 * range
        && c3.upper_wick() >= 0.7 * range
        && c3.lower_wick() <= 0.1 * range
    {
        found.push(BearishPattern::GravestoneDoji);
    }

    if range > 0.0 && c3.upper_wick() >= 0.6 * range && c3.high > c2.high {
        found.push(BearishPattern::WickRejection);
    }

    if c2.is_bullish()
        && c3.is_bearish()
        && c3.open <= c2.close
        && c3.close >= c2.open
        && c3.body() < 0.5 * c2.body()
    {
        found.push(BearishPattern::Harami);
    }

    if c2.is_bullish()
        && c3.is_bearish()
        && range > 0.0
        && c3.upper_wick() <= 0.05 * range
        && c3.body() >= 0.6 * range
    {
        found.push(BearishPattern::BeltHold);
    }

    if c2.is_bullish()
        && c3.is_bearish()
        && (c2.high - c3.high).abs() <= 0.001 * c3.high.abs().max(f64::EPSILON)
    {
        found.push(BearishPattern::TweezerTop);
    }

    found
}

fn detect_bullish(c1: &Candle, c2: &Candle, c3: &Candle) -> Vec<BullishPattern> {
    let mut found = Vec::new();
    let range = c3.range();

    if c2.is_bearish()
        && c3.is_bullish()
        && c3.open <= c2.close
        && c3.close >= c2.open
        && c3.body() > c2.body()
    {
        found.push(BullishPattern::Engulfing);
    }

    if range > 0.0
        && c3.lower_wick() >= 2.0 * c3.body()
        && c3.upper_wick() <= 0.15 * range
        && c2.close < c1.close
    {
        found.push(BullishPattern::Hammer);
    }

    if c1.is_bearish()
        && c1.range() > 0.0
        && c1.body() >= 0.6 * c1.range()
        && c2.body() <= 0.3 * c1.body()
        && c3.is_bullish()
        && c3.close > c1.body_mid()
    {
        found.push(BullishPattern::MorningStar);
    }

    if c2.is_bearish()
        && c3.is_bullish()
        && c3.open <= c2.close
        && c3.close > c2.body_mid()
        && c3.close < c2.open
    {
        found.push(BullishPattern::PiercingLine);
    }

    if [c1, c2, c3].iter().all(|c| c.is_bullish() && c.range() > 0.0 && c.body() >= 0.5 * c.range())
        && c2.close > c1.close
        && c3.close > c2.close
    {
        found.push(BullishPattern::ThreeWhiteSoldiers);
    }

    if c2.is_bearish()
        && c3.is_bullish()
        && c3.open >= c2.close
        && c3.close <= c2.open
        && c3.body() < 0.5 * c2.body()
    {
        found.push(BullishPattern::Harami);
    }

    found
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn c(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(0, open, high, low, close, 100.0)
    }

    #[test]
    fn fewer_than_three_closed_is_empty() {
        assert_eq!(detect_patterns(&[]), PatternAnalysis::default());
        let mut live = c(100.0, 101.0, 99.0, 100.5);
        live.is_closed = false;
        let candles = vec![c(100.0, 101.0, 99.0, 100.5), c(100.5, 102.0, 100.0, 101.5), live];
        assert_eq!(detect_patterns(&candles), PatternAnalysis::default());
    }

    #[test]
    fn bearish_engulfing() {
        let candles = vec![
            c(100.0, 101.0, 99.0, 100.5),
            c(100.0, 103.0, 99.8, 102.5),
            c(103.0, 103.2, 99.0, 99.5),
        ];
        let r = detect_patterns(&candles);
        assert!(r.bearish.contains(&BearishPattern::Engulfing));
        assert!(r.has_high_reliability_bearish());
        assert!(r.score >= 8.0);
    }

    #[test]
    fn shooting_star_after_advance() {
        let candles = vec![
            c(100.0, 101.0, 99.5, 100.5),
            c(100.5, 102.0, 100.4, 101.8),
            c(101.9, 106.0, 101.7, 101.7),
        ];
        let r = detect_patterns(&candles);
        assert!(r.bearish.contains(&BearishPattern::ShootingStar));
        assert!(r.bearish.contains(&BearishPattern::WickRejection));
        assert!(r.score <= MAX_PATTERN_SCORE);
    }

    #[test]
    fn three_black_crows() {
        let candles = vec![
            c(110.0, 110.5, 105.5, 106.0),
            c(107.0, 107.2, 102.0, 102.5),
            c(103.0, 103.1, 98.0, 98.5),
        ];
        let r = detect_patterns(&candles);
        assert!(r.bearish.contains(&BearishPattern::ThreeBlackCrows));
    }

    #[test]
    fn forming_candle_is_ignored() {
        let mut live = c(99.5, 99.6, 90.0, 90.5);
        live.is_closed = false;
        let candles = vec![
            c(100.0, 101.0, 99.0, 100.5),
            c(100.0, 103.0, 99.8, 102.5),
            c(103.0, 103.2, 99.0, 99.5),
            live,
        ];
        let r = detect_patterns(&candles);
        assert!(r.bearish.contains(&BearishPattern::Engulfing));
    }

    #[test]
    fn hammer_is_bullish_warning() {
        let candles = vec![
            c(105.0, 105.5, 102.0, 102.5),
            c(102.5, 103.0, 99.5, 100.0),
            c(100.0, 100.3, 95.0, 100.2),
        ];
        let r = detect_patterns(&candles);
        assert!(r.bullish.contains(&BullishPattern::Hammer));
        assert!(!r.has_high_reliability_bullish());
    }

    #[test]
    fn score_bonus_and_cap() {
        assert_eq!(score_patterns(&[]), 0.0);
        assert_eq!(score_patterns(&[BearishPattern::Harami]), 4.0);
        assert_eq!(
            score_patterns(&[BearishPattern::Engulfing, BearishPattern::ShootingStar]),
            17.0
        );
        let all = [
            BearishPattern::Engulfing,
            BearishPattern::EveningStar,
            BearishPattern::ThreeBlackCrows,
            BearishPattern::ShootingStar,
        ];
        assert_eq!(score_patterns(&all), MAX_PATTERN_SCORE);
    }

    #[test]
    fn flat_candles_match_nothing_bearish() {
        let candles = vec![c(1.0, 1.0, 1.0, 1.0); 3];
        let r = detect_patterns(&candles);
        assert!(r.bearish.is_empty());
        assert_eq!(r.score, 0.0);
    }
}
