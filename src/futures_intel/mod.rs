// =============================================================================
// Futures Intelligence Module
// =============================================================================
//
// Perpetual-market context that sits beside the candles:
//
//   1. Funding Rate       — cost of holding longs (crowd leaning long = fuel)
//   2. Open Interest      — participation behind the move
//   3. Long/Short Ratio   — crowd and top-trader positioning
//   4. Order flow         — resting book depth and liquidation clusters
//
// Every field is optional.  An absent field means "no data" and is never
// confused with a zero reading: a funding rate of 0.0 is present-and-neutral.

pub mod funding_rate;
pub mod long_short_ratio;
pub mod open_interest;
pub mod order_flow;

pub use funding_rate::{FundingReading, FundingTrend};
pub use long_short_ratio::PositioningRatio;
pub use open_interest::{OiReading, OiSignal};
pub use order_flow::{LiquidationHeatmap, OrderBookSummary};

use serde::{Deserialize, Serialize};

/// Optional perpetual-market data for one symbol.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketContext {
    /// Current funding rate as a decimal per 8h.
    pub funding_rate: Option<f64>,
    /// Recent funding prints, oldest first.
    pub funding_rate_history: Option<Vec<f64>>,
    pub open_interest: Option<f64>,
    /// Percent.
    pub oi_change_24h: Option<f64>,
    /// Exchange-reported 24h change in percent; preferred over the candle
    /// estimate when present.
    pub price_change_24h: Option<f64>,
    pub long_short_ratio: Option<PositioningRatio>,
    pub top_traders_ratio: Option<PositioningRatio>,
    pub order_book: Option<OrderBookSummary>,
    pub liquidation_heatmap: Option<LiquidationHeatmap>,
}

impl MarketContext {
    pub fn funding(&self, tolerance_pct: f64) -> Option<FundingReading> {
        let rate = self.funding_rate?;
        FundingReading::new(rate, self.funding_rate_history.as_deref(), tolerance_pct)
    }

    pub fn open_interest(&self) -> Option<OiReading> {
        OiReading::new(self.open_interest, self.oi_change_24h)
    }

    pub fn long_short(&self) -> Option<PositioningRatio> {
        self.long_short_ratio.and_then(PositioningRatio::validated)
    }

    pub fn top_traders(&self) -> Option<PositioningRatio> {
        self.top_traders_ratio.and_then(PositioningRatio::validated)
    }

    /// Exchange 24h change if present and finite.
    pub fn price_change_24h(&self) -> Option<f64> {
        self.price_change_24h.filter(|v| v.is_finite())
    }

    /// True when no derivatives data at all was supplied.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
