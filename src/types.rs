// =============================================================================
// Shared categorical types used across the indicator and scoring pipeline
// =============================================================================

use serde::{Deserialize, Serialize};

/// Directional classification of an indicator or timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Default for Trend {
    fn default() -> Self {
        Self::Neutral
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "BULLISH"),
            Self::Bearish => write!(f, "BEARISH"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Sign flip between the last two bars of a two-line system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crossover {
    Bullish,
    Bearish,
    None,
}

impl Default for Crossover {
    fn default() -> Self {
        Self::None
    }
}

impl Crossover {
    /// Classify the transition of `prev -> curr` across zero.
    pub fn from_sign_flip(prev: f64, curr: f64) -> Self {
        if prev <= 0.0 && curr > 0.0 {
            Self::Bullish
        } else if prev >= 0.0 && curr < 0.0 {
            Self::Bearish
        } else {
            Self::None
        }
    }
}

/// Bounded-oscillator zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscillatorZone {
    Overbought,
    Oversold,
    Neutral,
}

impl Default for OscillatorZone {
    fn default() -> Self {
        Self::Neutral
    }
}

impl std::fmt::Display for OscillatorZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Three-level grade shared by MACD momentum and divergence strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Default for Strength {
    fn default() -> Self {
        Self::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossover_sign_flip() {
        assert_eq!(Crossover::from_sign_flip(-1.0, 1.0), Crossover::Bullish);
        assert_eq!(Crossover::from_sign_flip(1.0, -1.0), Crossover::Bearish);
        assert_eq!(Crossover::from_sign_flip(1.0, 2.0), Crossover::None);
        assert_eq!(Crossover::from_sign_flip(-1.0, -2.0), Crossover::None);
    }

    #[test]
    fn trend_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Bearish).unwrap(), "\"bearish\"");
        assert_eq!(format!("{}", Trend::Bullish), "BULLISH");
    }

    #[test]
    fn strength_ordering() {
        assert!(Strength::Strong > Strength::Moderate);
        assert!(Strength::Moderate > Strength::Weak);
    }
}
