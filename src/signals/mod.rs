// =============================================================================
// Signals Module
// =============================================================================
//
// Short-setup scoring pipeline:
// - Five category sub-scores from the indicator set and market context
// - Critical bonus / penalty layer on top of the categories
// - Setup classification and the derived confidence figure

pub mod adjustments;
pub mod confidence;
pub mod short_score;

pub use adjustments::{evaluate_adjustments, CriticalAdjustments};
pub use confidence::{calculate_confidence, ConfidenceFactors, SetupType};
pub use short_score::{score_short, ShortScoreBreakdown};

use serde::{Deserialize, Serialize};

/// Risk bucket attached to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// What to do with a scored setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreDecision {
    Enter,
    Watch,
    Skip,
}

impl std::fmt::Display for ScoreDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enter => write!(f, "ENTER"),
            Self::Watch => write!(f, "WATCH"),
            Self::Skip => write!(f, "SKIP"),
        }
    }
}
