// =============================================================================
// Volatility Tier Classifier
// =============================================================================
//
// Additive integer score; each factor is independent:
//
//   Price level     <= 0 +0 (no price), < 0.0001 +3, < 0.01 +2, < 1 +1, else +0
//   Weighted ATR%   > 20 +3, > 10 +2, > 5 +1, else +0
//   |24h change|%   >= 50 +3, >= 25 +2, >= 10 +1, else +0
//   Age (candles)   < 24 +2, < 100 +1, else +0
//   Volume spike    current / avg > 10x +1, else +0
//
// Tier: score >= 5 -> 3, >= 2 -> 2, else 1.
//
// Confidence starts at 30 and grows with history and with stability of
// recent volatility (24h ATR vs 7d ATR); missing price costs 20.  Bounded to
// [10, 100].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use super::cache::{InMemoryTierCache, TierCache};
use super::metrics::{VolatilityMetrics, MIN_CANDLES_FOR_WINDOWS, WINDOW_14D, WINDOW_24H, WINDOW_7D};
use super::{ScoreFactors, TierResult, TierSource, VolatilityTier};
use crate::market_data::Candle;

/// Candle count below which an instrument is a new listing.
pub const NEW_COIN_CANDLES: usize = 100;

const VOLUME_SPIKE_RATIO: f64 = 10.0;
const VOLUME_LINE_PREFIX: &str = "Volume";

const BASE_CONFIDENCE: f64 = 30.0;
const NO_PRICE_PENALTY: f64 = 20.0;

pub const DEFAULT_TIER_TTL: Duration = Duration::from_secs(300);

// =============================================================================
// TierClassifier
// =============================================================================

/// Tier classifier backed by an injected cache.
pub struct TierClassifier {
    cache: Arc<dyn TierCache>,
    ttl: Duration,
}

impl TierClassifier {
    pub fn new(cache: Arc<dyn TierCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Classifier with a private in-memory cache.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(Arc::new(InMemoryTierCache::new()), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Classify `symbol` from its (hourly) candles.
    ///
    /// The scored result is served from cache while fresh.  Volume fields are
    /// recomputed from `candles` on every call.  An override forces the
    /// effective tier and is never written to the cache.
    pub fn classify(
        &self,
        symbol: &str,
        candles: &[Candle],
        tier_override: Option<VolatilityTier>,
    ) -> TierResult {
        let mut compute = || compute_tier(candles);
        let mut result = self.cache.get_or_compute(symbol, self.ttl, &mut compute);
        result.metrics.refresh_volume(candles);
        refresh_volume_line(&mut result.score_factors, result.metrics.volume_ratio);

        if let Some(forced) = tier_override {
            result = result.with_override(forced);
        }

        debug!(
            symbol,
            tier = result.tier.as_u8(),
            base_tier = result.base_tier.as_u8(),
            source = %result.source,
            score = result.score_factors.total_score,
            confidence = format!("{:.0}", result.confidence),
            volume_ratio = format!("{:.2}", result.metrics.volume_ratio),
            "volatility tier resolved"
        );

        result
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Default for TierClassifier {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TIER_TTL)
    }
}

// =============================================================================
// Scoring
// =============================================================================

/// Score and classify `candles` without touching any cache.
pub fn compute_tier(candles: &[Candle]) -> TierResult {
    let metrics = VolatilityMetrics::from_candles(candles);

    let (price_pts, price_line) = price_factor(metrics.current_price);
    let (atr_pts, atr_line) = atr_factor(metrics.weighted_atr());
    let (change_pts, change_line) = change_factor(metrics.price_change_24h);
    let (age_pts, age_line) = age_factor(metrics.candle_count);
    let (volume_pts, volume_line) = volume_factor(metrics.volume_ratio);

    let total_score = price_pts + atr_pts + change_pts + age_pts + volume_pts;
    let tier = VolatilityTier::from_score(total_score);
    let volume_adjusted = volume_pts > 0 && VolatilityTier::from_score(total_score - volume_pts) < tier;

    TierResult {
        tier,
        base_tier: tier,
        current_tier: tier,
        source: TierSource::Score,
        confidence: confidence(&metrics),
        is_new_coin: metrics.candle_count < NEW_COIN_CANDLES,
        volume_adjusted,
        score_factors: ScoreFactors {
            total_score,
            volume_points: volume_pts,
            breakdown: vec![price_line, atr_line, change_line, age_line, volume_line],
        },
        metrics,
        computed_at: Utc::now().to_rfc3339(),
    }
}

fn price_factor(price: f64) -> (u32, String) {
    if price <= 0.0 {
        return (0, "Price n/a: +0 (no price)".to_string());
    }
    let pts = if price < 0.0001 {
        3
    } else if price < 0.01 {
        2
    } else if price < 1.0 {
        1
    } else {
        0
    };
    (pts, format!("Price ${}: +{pts}", format_price(price)))
}

fn atr_factor(weighted_atr: f64) -> (u32, String) {
    let pts = if weighted_atr > 20.0 {
        3
    } else if weighted_atr > 10.0 {
        2
    } else if weighted_atr > 5.0 {
        1
    } else {
        0
    };
    (pts, format!("ATR {weighted_atr:.2}%: +{pts}"))
}

fn change_factor(change: f64) -> (u32, String) {
    let magnitude = change.abs();
    let pts = if magnitude >= 50.0 {
        3
    } else if magnitude >= 25.0 {
        2
    } else if magnitude >= 10.0 {
        1
    } else {
        0
    };
    (pts, format!("24h change {change:+.2}%: +{pts}"))
}

fn age_factor(candles: usize) -> (u32, String) {
    let pts = if candles < WINDOW_24H {
        2
    } else if candles < NEW_COIN_CANDLES {
        1
    } else {
        0
    };
    (pts, format!("Age {candles} candles: +{pts}"))
}

fn volume_factor(ratio: f64) -> (u32, String) {
    let pts = u32::from(ratio > VOLUME_SPIKE_RATIO);
    (pts, format!("{VOLUME_LINE_PREFIX} {ratio:.2}x avg: +{pts}"))
}

/// Rewrite the volume breakdown line from the live ratio.  The tier keeps
/// the points it was scored with; a mismatch is spelled out on the line.
fn refresh_volume_line(factors: &mut ScoreFactors, ratio: f64) {
    let (live_pts, mut line) = volume_factor(ratio);
    if live_pts != factors.volume_points {
        line = format!("{line} (tier scored with +{})", factors.volume_points);
    }
    match factors
        .breakdown
        .iter_mut()
        .find(|l| l.starts_with(VOLUME_LINE_PREFIX))
    {
        Some(slot) => *slot = line,
        None => factors.breakdown.push(line),
    }
}

fn confidence(metrics: &VolatilityMetrics) -> f64 {
    let n = metrics.candle_count;
    let history = if n >= WINDOW_14D {
        40.0
    } else if n >= WINDOW_7D {
        30.0
    } else if n >= NEW_COIN_CANDLES {
        20.0
    } else if n >= MIN_CANDLES_FOR_WINDOWS {
        10.0
    } else if n >= WINDOW_24H {
        5.0
    } else {
        0.0
    };

    let stability = if n >= MIN_CANDLES_FOR_WINDOWS && metrics.atr_7d > 0.0 {
        let ratio = metrics.atr_24h / metrics.atr_7d;
        if (0.75..=1.33).contains(&ratio) {
            30.0
        } else if (0.5..=2.0).contains(&ratio) {
            15.0
        } else {
            0.0
        }
    } else {
        0.0
    };

    let penalty = if metrics.current_price > 0.0 { 0.0 } else { NO_PRICE_PENALTY };

    (BASE_CONFIDENCE + history + stability - penalty).clamp(10.0, 100.0)
}

/// Enough decimals to show the first significant digits of tiny prices.
fn format_price(price: f64) -> String {
    if price >= 1.0 {
        format!("{price:.2}")
    } else if price >= 0.01 {
        format!("{price:.4}")
    } else {
        format!("{price:.8}")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::cache::ManualClock;

    /// `n` hourly candles at `price` with a high-low range of `range_pct`
    /// and a total drift of `change_pct` over the last 24 bars.
    fn market(n: usize, price: f64, range_pct: f64, change_pct: f64) -> Vec<Candle> {
        let start = price / (1.0 + change_pct / 100.0);
        (0..n)
            .map(|i| {
                let progress = if n > 24 && i + 24 >= n {
                    (i + 24 + 1 - n) as f64 / 24.0
                } else if n <= 24 {
                    (i + 1) as f64 / n as f64
                } else {
                    0.0
                };
                let close = start + (price - start) * progress;
                let half = close * range_pct / 200.0;
                Candle::new(i as i64 * 3_600_000, close, close + half, close - half, close, 1_000.0)
            })
            .collect()
    }

    fn entry<'a>(r: &'a TierResult, prefix: &str) -> &'a str {
        r.score_factors
            .breakdown
            .iter()
            .find(|l| l.starts_with(prefix))
            .map(String::as_str)
            .unwrap_or_default()
    }

    #[test]
    fn empty_candles_is_new_coin() {
        let r = compute_tier(&[]);
        assert!(r.is_new_coin);
        assert!((1..=3).contains(&r.tier.as_u8()));
        assert_eq!(r.confidence, 10.0);
        assert!(entry(&r, "Price").contains("+0"));
    }

    #[test]
    fn calm_large_cap_is_tier_one() {
        let r = compute_tier(&market(220, 100.0, 3.0, 5.0));
        assert_eq!(r.tier, VolatilityTier::Low);
        assert_eq!(r.source, TierSource::Score);
        assert!(!r.is_new_coin);
        assert!(entry(&r, "Price").contains("+0"));
    }

    #[test]
    fn volatile_micro_cap_is_tier_three() {
        let r = compute_tier(&market(220, 0.0005, 18.0, 35.0));
        assert_eq!(r.tier, VolatilityTier::High);
        assert!(entry(&r, "Price").contains("+2"));
    }

    #[test]
    fn sub_hundredth_of_a_cent_scores_three() {
        let r = compute_tier(&market(220, 0.00005, 3.0, 0.0));
        assert!(entry(&r, "Price").contains("+3"));
    }

    #[test]
    fn extreme_atr_scores_three() {
        let r = compute_tier(&market(220, 50.0, 25.0, 0.0));
        assert!(entry(&r, "ATR").contains("+3"));
    }

    #[test]
    fn young_listing_scores_two() {
        let r = compute_tier(&market(20, 5.0, 3.0, 0.0));
        assert!(entry(&r, "Age").contains("+2"));
        assert!(r.is_new_coin);
    }

    #[test]
    fn volume_spike_scores_one() {
        let mut candles = market(220, 5.0, 3.0, 0.0);
        if let Some(last) = candles.last_mut() {
            last.volume = 20_000.0;
        }
        let r = compute_tier(&candles);
        assert!(entry(&r, "Volume").contains("+1"));
    }

    #[test]
    fn stable_history_raises_confidence() {
        let r = compute_tier(&market(400, 100.0, 3.0, 0.0));
        // 30 base + 40 history + 30 stability
        assert_eq!(r.confidence, 100.0);
    }

    #[test]
    fn cached_tier_is_stable_and_volume_refreshes() {
        let clock = Arc::new(ManualClock::new());
        let classifier = TierClassifier::new(Arc::new(InMemoryTierCache::with_clock(clock.clone())), Duration::from_secs(60));

        let calm = market(220, 100.0, 3.0, 5.0);
        let first = classifier.classify("BTCUSDT", &calm, None);

        // Same symbol, wildly different candles: tier served from cache,
        // volume recomputed.
        let mut spiked = market(220, 0.0005, 18.0, 35.0);
        if let Some(last) = spiked.last_mut() {
            last.volume = 50_000.0;
        }
        let second = classifier.classify("BTCUSDT", &spiked, None);
        assert_eq!(second.tier, first.tier);
        assert!(second.metrics.volume_ratio > 10.0);
        assert_eq!(second.metrics.current_volume, 50_000.0);
        assert_eq!(second.score_factors.total_score, first.score_factors.total_score);
        assert_eq!(second.score_factors.breakdown.len(), first.score_factors.breakdown.len());

        clock.advance(Duration::from_secs(61));
        let third = classifier.classify("BTCUSDT", &spiked, None);
        assert_eq!(third.tier, VolatilityTier::High);

        classifier.clear_cache();
        let fourth = classifier.classify("BTCUSDT", &calm, None);
        assert!((1..=3).contains(&fourth.tier.as_u8()));
    }

    #[test]
    fn cache_hit_breakdown_shows_live_volume() {
        let classifier = TierClassifier::default();
        let calm = market(220, 100.0, 3.0, 5.0);
        let first = classifier.classify("SOLUSDT", &calm, None);
        assert_eq!(entry(&first, "Volume"), "Volume 1.00x avg: +0");

        let mut spiked = calm.clone();
        if let Some(last) = spiked.last_mut() {
            last.volume = 50_000.0;
        }
        let second = classifier.classify("SOLUSDT", &spiked, None);
        assert_eq!(second.score_factors.volume_points, 0);
        assert_eq!(entry(&second, "Volume"), "Volume 50.00x avg: +1 (tier scored with +0)");

        let text = crate::tier::format_tier_debug("SOLUSDT", &second);
        assert!(text.contains("ratio 50.00x"));
        assert!(text.contains("Volume 50.00x avg: +1 (tier scored with +0)"));
        assert!(!text.contains("Volume 1.00x avg"));
    }

    #[test]
    fn override_is_not_cached() {
        let classifier = TierClassifier::default();
        let calm = market(220, 100.0, 3.0, 5.0);

        let forced = classifier.classify("ETHUSDT", &calm, Some(VolatilityTier::High));
        assert_eq!(forced.tier, VolatilityTier::High);
        assert_eq!(forced.current_tier, VolatilityTier::High);
        assert_eq!(forced.base_tier, VolatilityTier::Low);
        assert_eq!(forced.source, TierSource::Override);

        let plain = classifier.classify("ETHUSDT", &calm, None);
        assert_eq!(plain.tier, VolatilityTier::Low);
        assert_eq!(plain.source, TierSource::Score);
    }
}
