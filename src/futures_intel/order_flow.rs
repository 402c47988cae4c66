// =============================================================================
// Order flow: resting book depth and nearby liquidation clusters
// =============================================================================

use serde::{Deserialize, Serialize};

/// Aggregated depth on each side of the book (quote notional).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSummary {
    pub bid_depth: f64,
    pub ask_depth: f64,
}

impl OrderBookSummary {
    /// Ask share of total depth in percent; `None` on an empty book.
    pub fn ask_share_pct(&self) -> Option<f64> {
        share_pct(self.ask_depth, self.bid_depth)
    }

    /// (bid - ask) / (bid + ask), in [-1, +1].
    pub fn imbalance(&self) -> Option<f64> {
        let total = self.bid_depth + self.ask_depth;
        if !(total > 0.0) || !total.is_finite() {
            return None;
        }
        Some((self.bid_depth - self.ask_depth) / total)
    }
}

/// Liquidation notional clustered near the current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidationHeatmap {
    /// Long positions that liquidate below price.
    pub long_liquidations: f64,
    /// Short positions that liquidate above price.
    pub short_liquidations: f64,
}

impl LiquidationHeatmap {
    /// Long share of nearby liquidations in percent; `None` when empty.
    pub fn long_share_pct(&self) -> Option<f64> {
        share_pct(self.long_liquidations, self.short_liquidations)
    }
}

fn share_pct(part: f64, other: f64) -> Option<f64> {
    if part < 0.0 || other < 0.0 {
        return None;
    }
    let total = part + other;
    if !(total > 0.0) || !total.is_finite() {
        return None;
    }
    Some(part / total * 100.0)
}
