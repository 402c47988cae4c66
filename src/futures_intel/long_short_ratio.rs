// =============================================================================
// Long/Short Ratio — crowd and top-trader positioning
// =============================================================================
//
// The exchange reports positioning either as account percentages or as a raw
// long/short ratio.  Both forms normalise into `PositioningRatio`:
//
//   long% = ratio / (1 + ratio) * 100
//
// Crowded longs are what a short setup feeds on; a top-trader book skewed
// short is confirmation from the better-informed side.

use serde::{Deserialize, Serialize};

/// Long / short split in percent (sums to 100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositioningRatio {
    pub long_pct: f64,
    pub short_pct: f64,
}

impl PositioningRatio {
    /// Build from percentages, renormalising to sum 100.
    ///
    /// Returns `None` for negative, non-finite or all-zero input.
    pub fn from_pcts(long_pct: f64, short_pct: f64) -> Option<Self> {
        if !long_pct.is_finite() || !short_pct.is_finite() || long_pct < 0.0 || short_pct < 0.0 {
            return None;
        }
        let total = long_pct + short_pct;
        if total <= 0.0 {
            return None;
        }
        Some(Self {
            long_pct: long_pct / total * 100.0,
            short_pct: short_pct / total * 100.0,
        })
    }

    /// Build from a raw long/short ratio (1.5 => 60% long / 40% short).
    pub fn from_ratio(ratio: f64) -> Option<Self> {
        if !ratio.is_finite() || ratio < 0.0 {
            return None;
        }
        let long_pct = ratio / (1.0 + ratio) * 100.0;
        Some(Self {
            long_pct,
            short_pct: 100.0 - long_pct,
        })
    }

    /// Raw long/short ratio; `None` when nobody is short.
    pub fn ratio(&self) -> Option<f64> {
        (self.short_pct > 0.0).then(|| self.long_pct / self.short_pct)
    }

    /// Bias label from the crowd's point of view.
    pub fn bias(&self) -> &'static str {
        if self.long_pct > 65.0 {
            "CROWDED_LONG"
        } else if self.short_pct > 65.0 {
            "CROWDED_SHORT"
        } else if self.long_pct > 55.0 {
            "LEANING_LONG"
        } else if self.short_pct > 55.0 {
            "LEANING_SHORT"
        } else {
            "BALANCED"
        }
    }

    /// Sanitised copy, or `None` when the values cannot be used.
    pub fn validated(self) -> Option<Self> {
        Self::from_pcts(self.long_pct, self.short_pct)
    }
}
