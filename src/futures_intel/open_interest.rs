// =============================================================================
// Open Interest — participation signal
// =============================================================================
//
// Open Interest (OI) is the total number of outstanding derivative contracts.
// Read together with price:
//
//   OI rising  + price rising   => new longs chasing the move (fuel for a flush)
//   OI falling                  => positions closing / being liquidated
//   anything else               => participation without a clear read

use serde::{Deserialize, Serialize};

/// Classified OI / price relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OiSignal {
    /// OI up at least the strong threshold while price rises.
    StrongLongBuildup,
    /// OI up at least the base threshold while price rises.
    LongBuildup,
    /// OI present, no notable change.
    Neutral,
    /// OI dropping: deleveraging, the move is losing fuel.
    Unwinding,
}

impl std::fmt::Display for OiSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongLongBuildup => write!(f, "STRONG_LONG_BUILDUP"),
            Self::LongBuildup => write!(f, "LONG_BUILDUP"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Unwinding => write!(f, "UNWINDING"),
        }
    }
}

/// Open interest with its 24h change, as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OiReading {
    /// Current open interest in contracts.
    pub open_interest: Option<f64>,
    /// OI change over 24h in percent.
    pub change_24h_pct: Option<f64>,
}

impl OiReading {
    /// `None` when neither value is present and finite.
    pub fn new(open_interest: Option<f64>, change_24h_pct: Option<f64>) -> Option<Self> {
        let open_interest = open_interest.filter(|v| v.is_finite());
        let change_24h_pct = change_24h_pct.filter(|v| v.is_finite());
        if open_interest.is_none() && change_24h_pct.is_none() {
            return None;
        }
        Some(Self {
            open_interest,
            change_24h_pct,
        })
    }

    /// Classify against `price_change_pct` with the given thresholds.
    ///
    /// `strong_increase` and `increase` are positive percentages;
    /// `decrease` is the (negative) change at or below which OI counts as
    /// unwinding.
    pub fn classify(&self, price_change_pct: f64, strong_increase: f64, increase: f64, decrease: f64) -> OiSignal {
        let Some(change) = self.change_24h_pct else {
            return OiSignal::Neutral;
        };
        let price_up = price_change_pct > 0.0;
        if change >= strong_increase && price_up {
            OiSignal::StrongLongBuildup
        } else if change >= increase && price_up {
            OiSignal::LongBuildup
        } else if change <= decrease {
            OiSignal::Unwinding
        } else {
            OiSignal::Neutral
        }
    }
}
