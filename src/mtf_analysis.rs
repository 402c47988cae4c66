// =============================================================================
// Multi-Timeframe (MTF) Trend Alignment
// =============================================================================
//
// Weighs the EMA-stack trend of each timeframe into one alignment score:
//
//   score = 50 + sum(25 * w)  over bearish timeframes
//              - sum(25 * w)  over bullish timeframes
//
//   weights: 4h 0.40, 2h 0.30, 1h 0.20, 15m 0.10
//
// Direction: score >= 65 bearish, <= 35 bullish, otherwise mixed.  The 5m
// trend is reported for display and never enters the score.  A timeframe
// with no candles contributes nothing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::ema::analyze_ema;
use crate::market_data::{closes, Timeframe, TimeframeCandles};
use crate::types::Trend;

const NEUTRAL_SCORE: f64 = 50.0;
const SHIFT: f64 = 25.0;
/// Score with every weighted timeframe bearish; the weights sum to 1.
pub const MAX_ALIGNMENT_SCORE: f64 = NEUTRAL_SCORE + SHIFT;
const BEARISH_AT: f64 = 65.0;
const BULLISH_AT: f64 = 35.0;

/// Overall alignment direction from the short side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentDirection {
    Bearish,
    Bullish,
    Mixed,
}

impl std::fmt::Display for AlignmentDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearish => write!(f, "BEARISH"),
            Self::Bullish => write!(f, "BULLISH"),
            Self::Mixed => write!(f, "MIXED"),
        }
    }
}

/// EMA trend on one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeframeTrend {
    pub timeframe: Timeframe,
    pub trend: Trend,
    pub weight: f64,
    pub candles: usize,
}

/// Full snapshot of the MTF analysis for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MtfAnalysis {
    /// 0..=100, 50 neutral; higher is more bearish.
    pub score: f64,
    pub direction: AlignmentDirection,
    /// Weighted timeframes that had candles, slowest first.
    pub trends: Vec<TimeframeTrend>,
    /// 5m trend, display only.
    pub trend_5m: Option<Trend>,
    pub reason: String,
}

impl Default for MtfAnalysis {
    fn default() -> Self {
        Self {
            score: NEUTRAL_SCORE,
            direction: AlignmentDirection::Mixed,
            trends: Vec::new(),
            trend_5m: None,
            reason: "no timeframes".to_string(),
        }
    }
}

impl MtfAnalysis {
    pub fn trend_of(&self, timeframe: Timeframe) -> Option<Trend> {
        self.trends
            .iter()
            .find(|t| t.timeframe == timeframe)
            .map(|t| t.trend)
    }
}

/// Perform MTF analysis for `symbol` over whatever timeframes are present.
pub fn analyze(symbol: &str, candles: &TimeframeCandles) -> MtfAnalysis {
    let mut score = NEUTRAL_SCORE;
    let mut trends = Vec::new();

    for tf in Timeframe::ALL.iter().rev().copied() {
        let weight = tf.alignment_weight();
        let series = candles.get(tf);
        if weight <= 0.0 || series.is_empty() {
            continue;
        }
        let trend = analyze_ema(&closes(series)).trend;
        match trend {
            Trend::Bearish => score += SHIFT * weight,
            Trend::Bullish => score -= SHIFT * weight,
            Trend::Neutral => {}
        }
        trends.push(TimeframeTrend {
            timeframe: tf,
            trend,
            weight,
            candles: series.len(),
        });
    }

    let trend_5m = {
        let series = candles.get(Timeframe::M5);
        (!series.is_empty()).then(|| analyze_ema(&closes(series)).trend)
    };

    let score = score.clamp(0.0, 100.0);
    let direction = if score >= BEARISH_AT {
        AlignmentDirection::Bearish
    } else if score <= BULLISH_AT {
        AlignmentDirection::Bullish
    } else {
        AlignmentDirection::Mixed
    };

    let reason = if trends.is_empty() {
        "no timeframes".to_string()
    } else {
        trends
            .iter()
            .map(|t| format!("{}: {}", t.timeframe, t.trend))
            .collect::<Vec<_>>()
            .join(", ")
    };

    debug!(
        symbol,
        score = format!("{:.1}", score),
        %direction,
        timeframes = trends.len(),
        "MTF analysis complete"
    );

    MtfAnalysis {
        score,
        direction,
        trends,
        trend_5m,
        reason,
    }
}
