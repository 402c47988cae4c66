// =============================================================================
// Confidence — how much to trust a score
// =============================================================================
//
//   confidence = total
//              x setup factor            (0.85 .. 1.08 by setup type)
//              x 1.05 if sentiment agrees
//              x 1.03 if MTF strongly bearish
//              x 1.05 enter_now / 1.02 ready
//   clamped to [20, 95]

use serde::{Deserialize, Serialize};

use crate::entry_timing::EntrySignal;
use crate::market_data::finite_or;

pub const MIN_CONFIDENCE: f64 = 20.0;
pub const MAX_CONFIDENCE: f64 = 95.0;

const SENTIMENT_FACTOR: f64 = 1.05;
const MTF_FACTOR: f64 = 1.03;
const ENTER_NOW_FACTOR: f64 = 1.05;
const READY_FACTOR: f64 = 1.02;

/// Dominant character of a short setup, ordered by historical reliability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupType {
    PerfectSetup,
    ConfirmedDivergence,
    FakePump,
    PatternBreakdown,
    OverboughtReversal,
    SentimentExtreme,
    FundingSqueeze,
    TrendContinuation,
    MeanReversion,
    Speculative,
}

impl SetupType {
    pub fn reliability_factor(self) -> f64 {
        match self {
            Self::PerfectSetup => 1.08,
            Self::ConfirmedDivergence => 1.06,
            Self::FakePump => 1.05,
            Self::PatternBreakdown => 1.04,
            Self::OverboughtReversal => 1.02,
            Self::SentimentExtreme => 1.0,
            Self::FundingSqueeze => 0.98,
            Self::TrendContinuation => 0.95,
            Self::MeanReversion => 0.92,
            Self::Speculative => 0.85,
        }
    }
}

impl Default for SetupType {
    fn default() -> Self {
        Self::Speculative
    }
}

impl std::fmt::Display for SetupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerfectSetup => write!(f, "PERFECT_SETUP"),
            Self::ConfirmedDivergence => write!(f, "CONFIRMED_DIVERGENCE"),
            Self::FakePump => write!(f, "FAKE_PUMP"),
            Self::PatternBreakdown => write!(f, "PATTERN_BREAKDOWN"),
            Self::OverboughtReversal => write!(f, "OVERBOUGHT_REVERSAL"),
            Self::SentimentExtreme => write!(f, "SENTIMENT_EXTREME"),
            Self::FundingSqueeze => write!(f, "FUNDING_SQUEEZE"),
            Self::TrendContinuation => write!(f, "TREND_CONTINUATION"),
            Self::MeanReversion => write!(f, "MEAN_REVERSION"),
            Self::Speculative => write!(f, "SPECULATIVE"),
        }
    }
}

/// Multipliers applied on top of the score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub setup: SetupType,
    pub sentiment_aligned: bool,
    pub mtf_strong_bearish: bool,
    /// `None` when entry timing was not evaluated.
    pub entry_signal: Option<EntrySignal>,
}

pub fn calculate_confidence(total: f64, factors: &ConfidenceFactors) -> f64 {
    let mut confidence = finite_or(total, 0.0) * factors.setup.reliability_factor();

    if factors.sentiment_aligned {
        confidence *= SENTIMENT_FACTOR;
    }
    if factors.mtf_strong_bearish {
        confidence *= MTF_FACTOR;
    }
    match factors.entry_signal {
        Some(EntrySignal::EnterNow) => confidence *= ENTER_NOW_FACTOR,
        Some(EntrySignal::Ready) => confidence *= READY_FACTOR,
        Some(EntrySignal::Wait) | None => {}
    }

    finite_or(confidence, MIN_CONFIDENCE).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
