mod common;

use short_radar::alt_config::{AltConfig, ConfigSet};
use short_radar::futures_intel::MarketContext;
use short_radar::market_data::{Timeframe, TimeframeCandles};
use short_radar::mtf_analysis::{self, AlignmentDirection, MAX_ALIGNMENT_SCORE};
use short_radar::indicators::divergence::Divergence;
use short_radar::signals::short_score::{divergence_score, momentum_score, price_action_score};
use short_radar::signals::{score_short, SetupType};
use short_radar::tier::VolatilityTier;
use short_radar::types::{Strength, Trend};

use common::{backdrop, crowded_long, drifting};

const TIERS: [VolatilityTier; 3] = [VolatilityTier::Low, VolatilityTier::Medium, VolatilityTier::High];

#[test]
fn momentum_never_falls_as_rsi_rises() {
    for tier in TIERS {
        let cfg = AltConfig::for_tier(tier);
        let mut ind = backdrop();
        let mut previous = f64::MIN;
        for step in 0..=60 {
            ind.rsi.value = 55.0 + step as f64 * 0.5;
            let score = momentum_score(&ind, &cfg);
            assert!(score >= previous, "tier {tier}: rsi {} dropped momentum", ind.rsi.value);
            previous = score;
        }
    }
}

#[test]
fn price_action_never_falls_as_change_rises() {
    for tier in TIERS {
        let cfg = AltConfig::for_tier(tier);
        let ind = backdrop();
        let mut previous = f64::MIN;
        for step in 0..=200 {
            let change = -20.0 + step as f64 * 0.5;
            let score = price_action_score(&ind, change, &cfg);
            assert!(score >= previous, "tier {tier}: change {change} dropped price action");
            previous = score;
        }
    }
}

#[test]
fn oversold_rsi_lowers_total() {
    for tier in TIERS {
        let cfg = AltConfig::for_tier(tier);
        let ctx = crowded_long();
        let mut ind = backdrop();

        ind.rsi.value = 55.0;
        let neutral = score_short(&ind, &ctx, None, &cfg);
        ind.rsi.value = 25.0;
        let oversold = score_short(&ind, &ctx, None, &cfg);

        assert!(oversold.total < neutral.total, "tier {tier}");
        assert!(oversold.penalties > neutral.penalties);
    }
}

#[test]
fn confirmed_strong_divergence_is_rewarded() {
    let cfg = AltConfig::medium();
    let mut ind = backdrop();
    let without = divergence_score(&ind, None, &cfg);

    ind.rsi_divergence.bearish = Some(Divergence {
        kind: Trend::Bearish,
        strength: Strength::Strong,
        confirmed: true,
        price_first: 1.0,
        price_second: 1.1,
        indicator_first: 78.0,
        indicator_second: 66.0,
        bars_ago: 2,
    });
    let with = divergence_score(&ind, None, &cfg);
    assert!(with > without);

    let scored = score_short(&ind, &MarketContext::default(), None, &cfg);
    assert_eq!(scored.setup_type, SetupType::ConfirmedDivergence);
    assert!(scored.adjustments.iter().any(|a| a.contains("Confirmed bearish divergence")));
}

#[test]
fn tier_configs_are_ordered() {
    let set = ConfigSet::default();
    assert!(set.tier_1.price_change.extreme < set.tier_2.price_change.extreme);
    assert!(set.tier_2.price_change.extreme < set.tier_3.price_change.extreme);
    assert!(set.tier_1.scoring.enter > set.tier_2.scoring.enter);
    assert!(set.tier_2.scoring.enter > set.tier_3.scoring.enter);
    set.validate().unwrap();
}

#[test]
fn absent_context_differs_from_neutral_context() {
    let cfg = AltConfig::medium();
    let ind = backdrop();
    let absent = score_short(&ind, &MarketContext::default(), None, &cfg);
    let neutral_ctx = MarketContext {
        funding_rate: Some(0.0),
        ..MarketContext::default()
    };
    let neutral = score_short(&ind, &neutral_ctx, None, &cfg);
    assert_eq!(absent.trend, 0.0);
    assert_eq!(neutral.trend, 1.0);
}

/// RSI feeds both the momentum bucket and the critical layer (oversold
/// penalty, perfect-setup bonus).
#[test]
fn rsi_is_counted_in_momentum_and_adjustments() {
    let cfg = AltConfig::medium();
    let ctx = MarketContext::default();

    let mut hot = backdrop();
    hot.rsi.value = 85.0;
    hot.bollinger.position = 95.0;
    let scored = score_short(&hot, &ctx, None, &cfg);
    // strong RSI bucket (+9) on top of MACD bearish (+5)
    assert_eq!(scored.momentum, 14.0);
    assert!(scored.adjustments.iter().any(|a| a.starts_with("Perfect setup")));
    assert_eq!(scored.bonuses, cfg.adjustments.perfect_setup);
    assert_eq!(scored.setup_type, SetupType::PerfectSetup);

    let mut cold = backdrop();
    cold.rsi.value = 20.0;
    let scored = score_short(&cold, &ctx, None, &cfg);
    // -8 oversold + 5 MACD, floored at zero, then the penalty on top
    assert_eq!(scored.momentum, 0.0);
    assert!(scored.adjustments.iter().any(|a| a.starts_with("RSI oversold")));
    assert_eq!(scored.penalties, cfg.adjustments.rsi_oversold);
}

#[test]
fn bearish_stack_on_every_timeframe_earns_strong_alignment() {
    let down = drifting(250, 100.0, -0.3, 1.0, 1_000.0);
    let candles = TimeframeCandles::new()
        .with(Timeframe::H4, down.clone())
        .with(Timeframe::H2, down.clone())
        .with(Timeframe::H1, down.clone())
        .with(Timeframe::M15, down.clone())
        .with(Timeframe::M5, down);
    let mtf = mtf_analysis::analyze("DOWNUSDT", &candles);
    assert!((mtf.score - MAX_ALIGNMENT_SCORE).abs() < 1e-10);
    assert_eq!(mtf.direction, AlignmentDirection::Bearish);

    let ind = backdrop();
    for tier in TIERS {
        let cfg = AltConfig::for_tier(tier);
        let scored = score_short(&ind, &MarketContext::default(), Some(&mtf), &cfg);
        assert!(scored.mtf_strong_bearish, "tier {tier}");
        assert!(
            scored.adjustments.iter().any(|a| a.starts_with("Strong bearish MTF alignment")),
            "tier {tier}: {:?}",
            scored.adjustments
        );
        assert!(scored.confidence_factors(None).mtf_strong_bearish);

        let without = divergence_score(&ind, None, &cfg);
        assert!(divergence_score(&ind, Some(&mtf), &cfg) > without, "tier {tier}");
    }
}
