// =============================================================================
// Volatility Tier Module
// =============================================================================
//
// Buckets an instrument into a volatility regime that selects the scoring
// thresholds:
//
//   1  LOW     large caps, calm tape         -> conservative thresholds
//   2  MEDIUM  mid caps / moderate swings    -> medium thresholds
//   3  HIGH    micro caps, new listings      -> aggressive thresholds
//
// The tier comes from an additive integer score over price level, ATR,
// 24h change, listing age and volume spike.  Results are cached per symbol
// for a short TTL; volume fields are refreshed on every call.

pub mod cache;
pub mod classifier;
pub mod debug;
pub mod metrics;

pub use cache::{Clock, InMemoryTierCache, ManualClock, SystemClock, TierCache};
pub use classifier::{compute_tier, TierClassifier};
pub use debug::format_tier_debug;
pub use metrics::VolatilityMetrics;

use serde::{Deserialize, Serialize};

// =============================================================================
// Types
// =============================================================================

/// Volatility regime bucket; serialised as the integer 1, 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum VolatilityTier {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl VolatilityTier {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Map an additive tier score onto a tier.
    pub fn from_score(score: u32) -> Self {
        if score >= 5 {
            Self::High
        } else if score >= 2 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl From<VolatilityTier> for u8 {
    fn from(tier: VolatilityTier) -> Self {
        tier.as_u8()
    }
}

impl TryFrom<u8> for VolatilityTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(format!("invalid volatility tier {other}, expected 1, 2 or 3")),
        }
    }
}

impl std::fmt::Display for VolatilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Where the effective tier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierSource {
    Score,
    Override,
}

impl std::fmt::Display for TierSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Score => write!(f, "score"),
            Self::Override => write!(f, "override"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreFactors {
    pub total_score: u32,
    /// Points the volume factor contributed when the tier was scored.
    #[serde(default)]
    pub volume_points: u32,
    /// One line per factor, e.g. `"Price $0.00005000: +3"`.
    pub breakdown: Vec<String>,
}

/// Complete tier classification for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierResult {
    /// Effective tier.
    pub tier: VolatilityTier,
    /// Tier the score alone produced.
    pub base_tier: VolatilityTier,
    /// Tier after any override.
    pub current_tier: VolatilityTier,
    pub source: TierSource,
    /// 10..=100
    pub confidence: f64,
    pub is_new_coin: bool,
    /// The volume-spike factor moved the instrument into a higher tier.
    pub volume_adjusted: bool,
    pub score_factors: ScoreFactors,
    pub metrics: VolatilityMetrics,
    /// RFC 3339 wall-clock time of the computation.
    pub computed_at: String,
}

impl TierResult {
    /// Copy of a scored result with `tier` forced by the caller.
    pub fn with_override(&self, tier: VolatilityTier) -> Self {
        Self {
            tier,
            current_tier: tier,
            source: TierSource::Override,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_serialises_as_integer() {
        assert_eq!(serde_json::to_string(&VolatilityTier::High).unwrap(), "3");
        let t: VolatilityTier = serde_json::from_str("1").unwrap();
        assert_eq!(t, VolatilityTier::Low);
        assert!(serde_json::from_str::<VolatilityTier>("4").is_err());
    }

    #[test]
    fn score_breakpoints() {
        assert_eq!(VolatilityTier::from_score(0), VolatilityTier::Low);
        assert_eq!(VolatilityTier::from_score(1), VolatilityTier::Low);
        assert_eq!(VolatilityTier::from_score(2), VolatilityTier::Medium);
        assert_eq!(VolatilityTier::from_score(4), VolatilityTier::Medium);
        assert_eq!(VolatilityTier::from_score(5), VolatilityTier::High);
        assert_eq!(VolatilityTier::from_score(12), VolatilityTier::High);
    }
}
