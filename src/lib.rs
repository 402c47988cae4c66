// =============================================================================
// short-radar — short-setup scoring core
// =============================================================================
//
// Candles -> indicators -> {multi-timeframe alignment, volatility tier}
//         -> tier thresholds -> composite short score -> confidence

pub mod alt_config;
pub mod analysis;
pub mod entry_timing;
pub mod futures_intel;
pub mod indicators;
pub mod market_data;
pub mod mtf_analysis;
pub mod signals;
pub mod tier;
pub mod types;

pub use alt_config::{AltConfig, ConfigSet};
pub use analysis::{MarketSnapshot, ShortAnalysis, ShortSetupAnalyzer};
pub use indicators::Indicators;
pub use signals::{RiskLevel, ShortScoreBreakdown};
pub use tier::{TierClassifier, TierResult, VolatilityTier};
