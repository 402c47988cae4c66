// =============================================================================
// Short Setup Analyzer — candles + context in, auditable report out
// =============================================================================
//
//   1. Indicators on the primary (hourly) series
//   2. Multi-timeframe alignment over every series present
//   3. Entry timing on the fastest series
//   4. Volatility tier (cached per symbol, optional override)
//   5. Tier config -> composite score -> confidence
//
// Every report carries a UUID so it can be traced through logs.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::alt_config::ConfigSet;
use crate::entry_timing::{self, EntryTiming};
use crate::futures_intel::{FundingReading, MarketContext};
use crate::indicators::divergence::DivergenceParams;
use crate::indicators::Indicators;
use crate::market_data::{Timeframe, TimeframeCandles};
use crate::mtf_analysis::{self, MtfAnalysis};
use crate::signals::{calculate_confidence, score_short, ShortScoreBreakdown};
use crate::tier::{TierCache, TierClassifier, TierResult, VolatilityTier};

/// Everything known about one symbol at one moment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSnapshot {
    pub candles: TimeframeCandles,
    pub context: MarketContext,
    /// Force the volatility tier instead of scoring it.
    pub tier_override: Option<VolatilityTier>,
}

/// Complete record of one short-setup analysis.
#[derive(Debug, Clone, Serialize)]
pub struct ShortAnalysis {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub symbol: String,
    /// RFC 3339.
    pub created_at: String,
    /// Series the indicators were computed on.
    pub timeframe: Option<Timeframe>,
    pub tier: TierResult,
    pub indicators: Indicators,
    pub mtf: MtfAnalysis,
    pub entry_timing: EntryTiming,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding: Option<FundingReading>,
    pub score: ShortScoreBreakdown,
    /// 20..=95
    pub confidence: f64,
}

pub struct ShortSetupAnalyzer {
    classifier: TierClassifier,
    configs: ConfigSet,
    divergence: DivergenceParams,
}

impl ShortSetupAnalyzer {
    pub fn new(classifier: TierClassifier, configs: ConfigSet) -> Self {
        Self {
            classifier,
            configs,
            divergence: DivergenceParams::default(),
        }
    }

    /// Analyzer over an injected tier cache.
    pub fn with_cache(cache: Arc<dyn TierCache>, ttl: Duration, configs: ConfigSet) -> Self {
        Self::new(TierClassifier::new(cache, ttl), configs)
    }

    pub fn with_divergence_params(mut self, params: DivergenceParams) -> Self {
        self.divergence = params;
        self
    }

    pub fn configs(&self) -> &ConfigSet {
        &self.configs
    }

    pub fn classifier(&self) -> &TierClassifier {
        &self.classifier
    }

    pub fn analyze(&self, symbol: &str, snapshot: &MarketSnapshot) -> ShortAnalysis {
        let (timeframe, primary) = snapshot.candles.primary();
        let indicators = Indicators::with_params(primary, self.divergence);

        let tier = self.classifier.classify(symbol, primary, snapshot.tier_override);
        let cfg = self.configs.get(tier.tier);

        let mtf = mtf_analysis::analyze(symbol, &snapshot.candles);
        let mtf_ref = (!mtf.trends.is_empty()).then_some(&mtf);
        let timing = entry_timing::analyze(symbol, &snapshot.candles, cfg);

        let score = score_short(&indicators, &snapshot.context, mtf_ref, cfg);
        let timing_signal = timing.timeframe.map(|_| timing.signal);
        let confidence = calculate_confidence(score.total, &score.confidence_factors(timing_signal));

        let funding = snapshot.context.funding(cfg.funding.trend_tolerance);

        let analysis = ShortAnalysis {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            timeframe,
            tier,
            indicators,
            mtf,
            entry_timing: timing,
            funding,
            score,
            confidence,
        };

        info!(
            id = %analysis.id,
            symbol,
            tier = analysis.tier.tier.as_u8(),
            total = format!("{:.1}", analysis.score.total),
            confidence = format!("{:.1}", analysis.confidence),
            risk = %analysis.score.risk_level,
            decision = %analysis.score.decision,
            setup = %analysis.score.setup_type,
            entry = %analysis.entry_timing.signal,
            "short setup analysed"
        );

        analysis
    }
}

impl Default for ShortSetupAnalyzer {
    fn default() -> Self {
        Self::new(TierClassifier::default(), ConfigSet::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::Candle;
    use crate::tier::{InMemoryTierCache, TierSource};

    fn pump(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = 1.0 + i as f64 * 0.004;
                Candle::new(i as i64 * 3_600_000, base, base * 1.01, base * 0.995, base * 1.004, 10_000.0)
            })
            .collect()
    }

    #[test]
    fn empty_snapshot_is_bounded() {
        let analyzer = ShortSetupAnalyzer::default();
        let report = analyzer.analyze("EMPTYUSDT", &MarketSnapshot::default());
        assert!((0.0..=100.0).contains(&report.score.total));
        assert!((20.0..=95.0).contains(&report.confidence));
        assert!(report.tier.is_new_coin);
        assert!(report.timeframe.is_none());
        assert!(uuid::Uuid::parse_str(&report.id).is_ok());
    }

    #[test]
    fn override_selects_config_and_is_reported() {
        let analyzer = ShortSetupAnalyzer::default();
        let snapshot = MarketSnapshot {
            candles: TimeframeCandles::new().with(Timeframe::H1, pump(220)),
            tier_override: Some(VolatilityTier::High),
            ..MarketSnapshot::default()
        };
        let report = analyzer.analyze("PUMPUSDT", &snapshot);
        assert_eq!(report.tier.tier, VolatilityTier::High);
        assert_eq!(report.tier.source, TierSource::Override);
        assert_eq!(report.timeframe, Some(Timeframe::H1));
    }

    #[test]
    fn shared_cache_is_used() {
        let cache = Arc::new(InMemoryTierCache::new());
        let analyzer = ShortSetupAnalyzer::with_cache(cache.clone(), Duration::from_secs(60), ConfigSet::default());
        let snapshot = MarketSnapshot {
            candles: TimeframeCandles::new().with(Timeframe::H1, pump(120)),
            ..MarketSnapshot::default()
        };
        analyzer.analyze("AUSDT", &snapshot);
        analyzer.analyze("BUSDT", &snapshot);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn snapshot_parses_from_json() {
        let json = r#"{
            "candles": { "1h": [
                { "timestamp": 0, "open": 1.0, "high": 1.1, "low": 0.9, "close": 1.05, "volume": 10.0 }
            ] },
            "context": { "funding_rate": 0.0004 },
            "tier_override": 2
        }"#;
        let snapshot: MarketSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.candles.get(Timeframe::H1).len(), 1);
        assert_eq!(snapshot.context.funding_rate, Some(0.0004));
        assert_eq!(snapshot.tier_override, Some(VolatilityTier::Medium));
    }
}
