// =============================================================================
// Funding Rate — crowd positioning cost on perpetual futures
// =============================================================================
//
// Funding rates are periodic payments between longs and shorts that anchor the
// perpetual contract price to spot.  Positive funding means longs pay shorts:
// the crowd leans long, which is the fuel a short setup wants.
//
// Rates arrive as decimals per 8h interval (0.0001 = 0.01%).  Three funding
// events per day give:
//
//   annualized% = rate% * 3 * 365

use serde::{Deserialize, Serialize};

/// Funding events per day on 8h perpetuals.
const FUNDINGS_PER_DAY: f64 = 3.0;

/// Direction of recent funding prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundingTrend {
    Rising,
    Falling,
    Stable,
}

impl std::fmt::Display for FundingTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rising => write!(f, "RISING"),
            Self::Falling => write!(f, "FALLING"),
            Self::Stable => write!(f, "STABLE"),
        }
    }
}

/// Interpreted funding state for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingReading {
    /// Raw funding rate as a decimal (e.g. 0.0001 = 0.01%).
    pub rate: f64,

    /// Funding rate as a percentage (e.g. 0.01).
    pub rate_pct: f64,

    /// Percentage per year at the current rate.
    pub annualized_pct: f64,

    /// `None` when no usable history was supplied.
    pub trend: Option<FundingTrend>,

    /// Human-readable explanation.
    pub interpretation: String,
}

impl FundingReading {
    /// Interpret `rate` with optional `history` (oldest first, decimals).
    ///
    /// `tolerance_pct` is the change in percentage points below which the
    /// trend is reported as stable.  Returns `None` for a non-finite rate.
    pub fn new(rate: f64, history: Option<&[f64]>, tolerance_pct: f64) -> Option<Self> {
        if !rate.is_finite() {
            return None;
        }
        let rate_pct = rate * 100.0;
        let trend = history.and_then(|h| funding_trend(h, tolerance_pct));

        let interpretation = if rate_pct > 0.05 {
            "Extreme positive funding - overleveraged longs"
        } else if rate_pct > 0.03 {
            "Elevated positive funding - crowd leaning long"
        } else if rate_pct < -0.05 {
            "Extreme negative funding - short squeeze risk"
        } else if rate_pct < -0.03 {
            "Elevated negative funding - shorts paying"
        } else if rate_pct > 0.01 {
            "Slightly positive funding - normal conditions"
        } else if rate_pct < -0.01 {
            "Slightly negative funding - mild short bias"
        } else {
            "Neutral funding rate"
        };

        Some(Self {
            rate,
            rate_pct,
            annualized_pct: annualized_pct(rate_pct),
            trend,
            interpretation: interpretation.to_string(),
        })
    }
}

/// Annualized funding in percent from a per-interval percentage.
pub fn annualized_pct(rate_pct: f64) -> f64 {
    rate_pct * FUNDINGS_PER_DAY * 365.0
}

/// Compare the mean of the newer half of `history` against the older half.
///
/// Needs at least two finite prints; `tolerance_pct` is in percentage points.
pub fn funding_trend(history: &[f64], tolerance_pct: f64) -> Option<FundingTrend> {
    let prints: Vec<f64> = history.iter().copied().filter(|r| r.is_finite()).collect();
    if prints.len() < 2 {
        return None;
    }
    let mid = prints.len() / 2;
    let (older, newer) = prints.split_at(mid);
    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64 * 100.0;
    let delta = mean(newer) - mean(older);

    Some(if delta > tolerance_pct {
        FundingTrend::Rising
    } else if delta < -tolerance_pct {
        FundingTrend::Falling
    } else {
        FundingTrend::Stable
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annualizes_three_prints_per_day() {
        let r = FundingReading::new(0.0001, None, 0.001).unwrap();
        assert!((r.rate_pct - 0.01).abs() < 1e-12);
        assert!((r.annualized_pct - 10.95).abs() < 1e-9);
        assert!(r.trend.is_none());
    }

    #[test]
    fn non_finite_rate_is_absent() {
        assert!(FundingReading::new(f64::NAN, None, 0.001).is_none());
    }

    #[test]
    fn trend_from_history() {
        let rising = [0.0001, 0.0001, 0.0003, 0.0004];
        assert_eq!(funding_trend(&rising, 0.001), Some(FundingTrend::Rising));
        let falling = [0.0004, 0.0003, 0.0001, -0.0001];
        assert_eq!(funding_trend(&falling, 0.001), Some(FundingTrend::Falling));
        let flat = [0.0001; 6];
        assert_eq!(funding_trend(&flat, 0.001), Some(FundingTrend::Stable));
        assert_eq!(funding_trend(&[0.0001], 0.001), None);
    }

    #[test]
    fn interpretation_labels() {
        let r = FundingReading::new(0.0008, None, 0.001).unwrap();
        assert!(r.interpretation.contains("overleveraged longs"));
        let r = FundingReading::new(-0.0008, None, 0.001).unwrap();
        assert!(r.interpretation.contains("squeeze"));
    }
}
