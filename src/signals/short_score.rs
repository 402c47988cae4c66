// =============================================================================
// Short Score — five-category composite for a short setup
// =============================================================================
//
//   momentum    0..25  RSI bucket, StochRSI state, MACD, ADX + direction
//   volatility  0..20  24h change, Bollinger position, VWAP deviation
//   volume      0..20  crowd long share, top-trader short share
//   trend       0..15  funding bucket + funding trend, open interest
//   divergence  0..20  RSI/MACD divergence, OBV, fake pump, MTF alignment
//
// The field names are category labels, not the literal indicators.
// Thresholds come from the tier's `AltConfig`; the point values below are
// fixed.
//
//   total = clamp(sum(categories) + bonuses - penalties, 0, 100)

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::adjustments::{evaluate_adjustments, CriticalAdjustments};
use super::confidence::{ConfidenceFactors, SetupType};
use super::{RiskLevel, ScoreDecision};
use crate::alt_config::AltConfig;
use crate::entry_timing::EntrySignal;
use crate::futures_intel::{FundingTrend, MarketContext, OiSignal};
use crate::indicators::adx::TrendStrength;
use crate::indicators::Indicators;
use crate::market_data::finite_or;
use crate::mtf_analysis::{AlignmentDirection, MtfAnalysis};
use crate::types::{Crossover, OscillatorZone, Strength, Trend};

pub const MOMENTUM_CAP: f64 = 25.0;
pub const PRICE_ACTION_CAP: f64 = 20.0;
pub const SENTIMENT_CAP: f64 = 20.0;
pub const DERIVATIVES_CAP: f64 = 15.0;
pub const DIVERGENCE_CAP: f64 = 20.0;

// --- Momentum points ---------------------------------------------------------
const RSI_EXTREME_PTS: f64 = 12.0;
const RSI_STRONG_PTS: f64 = 9.0;
const RSI_OVERBOUGHT_PTS: f64 = 6.0;
const RSI_ELEVATED_PTS: f64 = 3.0;
const RSI_WEAK_PTS: f64 = -3.0;
const RSI_OVERSOLD_PTS: f64 = -8.0;
const STOCH_OVERBOUGHT_LEVEL: f64 = 80.0;
const STOCH_BEARISH_CROSS_PTS: f64 = 5.0;
const STOCH_OVERBOUGHT_PTS: f64 = 3.0;
const STOCH_K_BELOW_D_PTS: f64 = 1.0;
const STOCH_OVERSOLD_PTS: f64 = -5.0;
const MACD_BEARISH_PTS: f64 = 5.0;
const MACD_BEARISH_CROSS_PTS: f64 = 2.0;
const ADX_STRONG_BEARISH_PTS: f64 = 2.0;
const ADX_MODERATE_BEARISH_PTS: f64 = 1.0;

// --- Price action points -----------------------------------------------------
const CHANGE_EXTREME_PTS: f64 = 8.0;
const CHANGE_STRONG_PTS: f64 = 6.0;
const CHANGE_MODERATE_PTS: f64 = 4.0;
const CHANGE_MINIMUM_PTS: f64 = 2.0;
const BAND_PTS: [f64; 3] = [6.0, 4.0, 2.0];
const BELOW_VWAP_PTS: f64 = -3.0;

// --- Sentiment points --------------------------------------------------------
const CROWD_PTS: [f64; 3] = [10.0, 7.0, 4.0];
const LEANING_PTS: f64 = 1.0;
const LS_SHORT_HEAVY_PTS: f64 = -2.0;
const LS_EXTREME_SHORT_PTS: f64 = -5.0;
const TT_LONG_HEAVY_PTS: f64 = -3.0;
const TT_EXTREME_LONG_PTS: f64 = -6.0;

// --- Derivatives points ------------------------------------------------------
const FUNDING_EXTREME_PTS: f64 = 7.0;
const FUNDING_HIGH_PTS: f64 = 5.0;
const FUNDING_ELEVATED_PTS: f64 = 3.0;
const FUNDING_POSITIVE_PTS: f64 = 1.0;
const FUNDING_NEGATIVE_PTS: f64 = -2.0;
const FUNDING_EXTREME_NEGATIVE_PTS: f64 = -5.0;
const FUNDING_TREND_PTS: f64 = 3.0;

// --- Divergence points -------------------------------------------------------
const RSI_DIV_PTS: [f64; 3] = [2.0, 4.0, 6.0];
const RSI_DIV_CONFIRMED_PTS: f64 = 2.0;
const MACD_DIV_PTS: [f64; 3] = [2.0, 3.0, 4.0];
const MACD_DIV_CONFIRMED_PTS: f64 = 1.0;
const OBV_BEARISH_TREND_PTS: f64 = 2.0;
const OBV_DIVERGENCE_PTS: f64 = 3.0;
const FAKE_PUMP_MAX_PTS: f64 = 6.0;
const MTF_BEARISH_PTS: f64 = 3.0;
const MTF_STRONG_PTS: f64 = 5.0;
const MTF_BULLISH_PTS: f64 = -5.0;

/// Scored short setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortScoreBreakdown {
    /// 0..=100
    pub total: f64,
    pub trend: f64,
    pub momentum: f64,
    pub volatility: f64,
    pub volume: f64,
    pub divergence: f64,
    pub bonuses: f64,
    pub penalties: f64,
    pub adjustments: Vec<String>,
    pub risk_level: RiskLevel,
    pub decision: ScoreDecision,
    pub setup_type: SetupType,
    pub sentiment_aligned: bool,
    pub mtf_strong_bearish: bool,
}

impl ShortScoreBreakdown {
    /// Sum of the five categories before the critical layer.
    pub fn category_sum(&self) -> f64 {
        self.trend + self.momentum + self.volatility + self.volume + self.divergence
    }

    pub fn confidence_factors(&self, entry_signal: Option<EntrySignal>) -> ConfidenceFactors {
        ConfidenceFactors {
            setup: self.setup_type,
            sentiment_aligned: self.sentiment_aligned,
            mtf_strong_bearish: self.mtf_strong_bearish,
            entry_signal,
        }
    }
}

/// Score a short setup.
///
/// `mtf` is `None` when no higher-timeframe candles were available; the
/// alignment terms are then skipped rather than scored as neutral.
pub fn score_short(
    ind: &Indicators,
    ctx: &MarketContext,
    mtf: Option<&MtfAnalysis>,
    cfg: &AltConfig,
) -> ShortScoreBreakdown {
    let price_change = effective_price_change(ind, ctx);

    let momentum = momentum_score(ind, cfg);
    let volatility = price_action_score(ind, price_change, cfg);
    let volume = sentiment_score(ctx, cfg);
    let trend = derivatives_score(ctx, price_change, cfg);
    let divergence = divergence_score(ind, mtf, cfg);

    let adj = evaluate_adjustments(ind, ctx, mtf, price_change, cfg);
    let raw = momentum + volatility + volume + trend + divergence + adj.net();
    let total = finite_or(raw, 0.0).clamp(0.0, 100.0);

    let risk_level = risk_level(total, &adj, cfg);
    let decision = decide(total, cfg);
    let setup_type = classify_setup(ind, ctx, mtf, price_change, &adj, cfg);
    let mtf_strong_bearish = mtf.is_some_and(|m| m.score >= cfg.multi_tf.strong_alignment);

    debug!(
        momentum = format!("{:.1}", momentum),
        volatility = format!("{:.1}", volatility),
        volume = format!("{:.1}", volume),
        trend = format!("{:.1}", trend),
        divergence = format!("{:.1}", divergence),
        bonuses = adj.bonuses,
        penalties = adj.penalties,
        total = format!("{:.1}", total),
        %risk_level,
        %setup_type,
        "short score computed"
    );

    ShortScoreBreakdown {
        total,
        trend,
        momentum,
        volatility,
        volume,
        divergence,
        bonuses: adj.bonuses,
        penalties: adj.penalties,
        risk_level,
        decision,
        setup_type,
        sentiment_aligned: adj.perfect_sentiment,
        mtf_strong_bearish,
        adjustments: adj.applied,
    }
}

/// Exchange-reported 24h change when supplied, else the candle estimate.
pub fn effective_price_change(ind: &Indicators, ctx: &MarketContext) -> f64 {
    finite_or(ctx.price_change_24h().unwrap_or(ind.price_change_24h), 0.0)
}

// =============================================================================
// Categories
// =============================================================================

/// RSI bucket, StochRSI state, MACD and ADX direction.
pub fn momentum_score(ind: &Indicators, cfg: &AltConfig) -> f64 {
    let t = &cfg.rsi;
    let rsi = ind.rsi.value;
    let mut score = if rsi >= t.extreme {
        RSI_EXTREME_PTS
    } else if rsi >= t.strong {
        RSI_STRONG_PTS
    } else if rsi >= t.overbought {
        RSI_OVERBOUGHT_PTS
    } else if rsi >= t.elevated {
        RSI_ELEVATED_PTS
    } else if rsi <= t.oversold {
        RSI_OVERSOLD_PTS
    } else if rsi < t.weak {
        RSI_WEAK_PTS
    } else {
        0.0
    };

    let stoch = &ind.stoch_rsi;
    score += if stoch.cross == Crossover::Bearish && stoch.d >= STOCH_OVERBOUGHT_LEVEL {
        STOCH_BEARISH_CROSS_PTS
    } else if stoch.zone == OscillatorZone::Overbought {
        STOCH_OVERBOUGHT_PTS
    } else if stoch.zone == OscillatorZone::Oversold {
        STOCH_OVERSOLD_PTS
    } else if stoch.k < stoch.d {
        STOCH_K_BELOW_D_PTS
    } else {
        0.0
    };

    if ind.macd.trend == Trend::Bearish {
        score += MACD_BEARISH_PTS;
    }
    if ind.macd.crossover == Crossover::Bearish {
        score += MACD_BEARISH_CROSS_PTS;
    }

    if ind.adx.signal == Trend::Bearish {
        score += match ind.adx.trend_strength {
            TrendStrength::Strong => ADX_STRONG_BEARISH_PTS,
            TrendStrength::Moderate => ADX_MODERATE_BEARISH_PTS,
            TrendStrength::Weak | TrendStrength::None => 0.0,
        };
    }

    score.clamp(0.0, MOMENTUM_CAP)
}

/// 24h change, Bollinger position and VWAP stretch.
pub fn price_action_score(ind: &Indicators, price_change: f64, cfg: &AltConfig) -> f64 {
    let p = &cfg.price_change;
    let mut score = if price_change >= p.extreme {
        CHANGE_EXTREME_PTS
    } else if price_change >= p.strong {
        CHANGE_STRONG_PTS
    } else if price_change >= p.moderate {
        CHANGE_MODERATE_PTS
    } else if price_change >= p.minimum {
        CHANGE_MINIMUM_PTS
    } else {
        0.0
    };

    let b = &cfg.bollinger;
    score += graded(ind.bollinger.position, [b.very_high, b.high, b.elevated], BAND_PTS);

    let v = &cfg.vwap;
    let deviation = ind.vwap.deviation_pct;
    score += if deviation < 0.0 {
        BELOW_VWAP_PTS
    } else {
        graded(deviation, [v.extreme, v.strong, v.moderate], BAND_PTS)
    };

    score.clamp(0.0, PRICE_ACTION_CAP)
}

/// Crowd and top-trader positioning; 0 when neither ratio is present.
pub fn sentiment_score(ctx: &MarketContext, cfg: &AltConfig) -> f64 {
    let mut score = 0.0;

    if let Some(ls) = ctx.long_short() {
        let t = &cfg.long_short;
        let long = ls.long_pct;
        score += if long >= 50.0 {
            let pts = graded(long, [t.extreme, t.high, t.moderate], CROWD_PTS);
            if pts > 0.0 {
                pts
            } else {
                LEANING_PTS
            }
        } else if long <= t.extreme_short {
            LS_EXTREME_SHORT_PTS
        } else if long <= t.short_heavy {
            LS_SHORT_HEAVY_PTS
        } else {
            0.0
        };
    }

    if let Some(tt) = ctx.top_traders() {
        let t = &cfg.top_traders;
        let short = tt.short_pct;
        score += if short >= 50.0 {
            let pts = graded(short, [t.extreme, t.high, t.moderate], CROWD_PTS);
            if pts > 0.0 {
                pts
            } else {
                LEANING_PTS
            }
        } else if short <= t.extreme_long {
            TT_EXTREME_LONG_PTS
        } else if short <= t.long_heavy {
            TT_LONG_HEAVY_PTS
        } else {
            0.0
        };
    }

    score.clamp(0.0, SENTIMENT_CAP)
}

/// Funding bucket and trend plus open interest; absent data adds nothing.
pub fn derivatives_score(ctx: &MarketContext, price_change: f64, cfg: &AltConfig) -> f64 {
    let mut score = 0.0;

    let f = &cfg.funding;
    if let Some(funding) = ctx.funding(f.trend_tolerance) {
        let rate = funding.rate_pct;
        score += if rate >= f.extreme {
            FUNDING_EXTREME_PTS
        } else if rate >= f.high {
            FUNDING_HIGH_PTS
        } else if rate >= f.elevated {
            FUNDING_ELEVATED_PTS
        } else if rate >= 0.0 {
            FUNDING_POSITIVE_PTS
        } else if rate > f.extreme_negative {
            FUNDING_NEGATIVE_PTS
        } else {
            FUNDING_EXTREME_NEGATIVE_PTS
        };

        score += match funding.trend {
            Some(FundingTrend::Rising) => FUNDING_TREND_PTS,
            Some(FundingTrend::Falling) => -FUNDING_TREND_PTS,
            Some(FundingTrend::Stable) | None => 0.0,
        };
    }

    if let Some(oi) = ctx.open_interest() {
        let t = &cfg.open_interest;
        score += oi_points(oi.classify(price_change, t.strong_increase, t.increase, t.decrease));
    }

    score.clamp(0.0, DERIVATIVES_CAP)
}

pub fn oi_points(signal: OiSignal) -> f64 {
    match signal {
        OiSignal::StrongLongBuildup => 5.0,
        OiSignal::LongBuildup => 2.0,
        OiSignal::Neutral => 1.0,
        OiSignal::Unwinding => 0.0,
    }
}

/// Divergences, OBV, fake pump and multi-timeframe alignment.
pub fn divergence_score(ind: &Indicators, mtf: Option<&MtfAnalysis>, cfg: &AltConfig) -> f64 {
    let mut score = 0.0;

    if let Some(d) = ind.rsi_divergence.bearish {
        score += RSI_DIV_PTS[strength_index(d.strength)];
        if d.confirmed {
            score += RSI_DIV_CONFIRMED_PTS;
        }
    }
    if let Some(d) = ind.macd_divergence.bearish {
        score += MACD_DIV_PTS[strength_index(d.strength)];
        if d.confirmed {
            score += MACD_DIV_CONFIRMED_PTS;
        }
    }

    if ind.obv.trend == Trend::Bearish {
        score += OBV_BEARISH_TREND_PTS;
    }
    if ind.obv.divergence == Trend::Bearish {
        score += OBV_DIVERGENCE_PTS;
    }

    let fp = &ind.fake_pump;
    if fp.is_fake && fp.confidence >= cfg.scoring.fake_pump_min_confidence {
        score += (fp.confidence.clamp(0.0, 100.0) / 100.0 * FAKE_PUMP_MAX_PTS).round();
    }

    if let Some(m) = mtf {
        if m.score >= cfg.multi_tf.strong_alignment {
            score += MTF_STRONG_PTS;
        } else if m.direction == AlignmentDirection::Bearish {
            score += MTF_BEARISH_PTS;
        } else if m.score <= cfg.multi_tf.bullish_alignment {
            score += MTF_BULLISH_PTS;
        }
    }

    score.clamp(0.0, DIVERGENCE_CAP)
}

// =============================================================================
// Risk, decision, setup type
// =============================================================================

pub fn risk_level(total: f64, adj: &CriticalAdjustments, cfg: &AltConfig) -> RiskLevel {
    let s = &cfg.scoring;
    if total >= s.risk_low && adj.penalty_count == 0 {
        RiskLevel::Low
    } else if total >= s.risk_medium
        || (total >= s.risk_medium_fallback && adj.penalties < s.risk_penalty_tolerance)
    {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

pub fn decide(total: f64, cfg: &AltConfig) -> ScoreDecision {
    if total >= cfg.scoring.enter {
        ScoreDecision::Enter
    } else if total >= cfg.scoring.watch {
        ScoreDecision::Watch
    } else {
        ScoreDecision::Skip
    }
}

/// First matching setup, most reliable first.
pub fn classify_setup(
    ind: &Indicators,
    ctx: &MarketContext,
    mtf: Option<&MtfAnalysis>,
    price_change: f64,
    adj: &CriticalAdjustments,
    cfg: &AltConfig,
) -> SetupType {
    let fp = &ind.fake_pump;
    let crowd_extreme = ctx.long_short().is_some_and(|ls| ls.long_pct >= cfg.long_short.extreme)
        || ctx.top_traders().is_some_and(|tt| tt.short_pct >= cfg.top_traders.extreme);
    let funding_hot = ctx
        .funding(cfg.funding.trend_tolerance)
        .is_some_and(|f| f.rate_pct >= cfg.funding.high);

    if adj.perfect_setup {
        SetupType::PerfectSetup
    } else if ind.rsi_divergence.bearish_confirmed() || ind.macd_divergence.bearish_confirmed() {
        SetupType::ConfirmedDivergence
    } else if fp.is_fake && fp.confidence >= cfg.scoring.fake_pump_min_confidence {
        SetupType::FakePump
    } else if ind.patterns.has_high_reliability_bearish() {
        SetupType::PatternBreakdown
    } else if ind.rsi.value >= cfg.rsi.overbought
        && (ind.macd.weakening || ind.stoch_rsi.cross == Crossover::Bearish)
    {
        SetupType::OverboughtReversal
    } else if crowd_extreme {
        SetupType::SentimentExtreme
    } else if funding_hot {
        SetupType::FundingSqueeze
    } else if ind.ema.trend == Trend::Bearish && mtf.is_some_and(|m| m.direction == AlignmentDirection::Bearish) {
        SetupType::TrendContinuation
    } else if ind.bollinger.position >= cfg.bollinger.high
        || ind.vwap.deviation_pct >= cfg.vwap.strong
        || price_change >= cfg.price_change.strong
    {
        SetupType::MeanReversion
    } else {
        SetupType::Speculative
    }
}

/// Points for the first threshold (descending) that `value` reaches.
fn graded(value: f64, thresholds: [f64; 3], points: [f64; 3]) -> f64 {
    thresholds
        .iter()
        .zip(points)
        .find(|(t, _)| value >= **t)
        .map_or(0.0, |(_, p)| p)
}

fn strength_index(strength: Strength) -> usize {
    match strength {
        Strength::Weak => 0,
        Strength::Moderate => 1,
        Strength::Strong => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::futures_intel::PositioningRatio;
    use crate::indicators::divergence::Divergence;

    fn base() -> Indicators {
        let mut ind = Indicators::default();
        ind.rsi.value = 55.0;
        ind.bollinger.position = 55.0;
        ind.price_change_24h = 4.0;
        ind
    }

    fn bearish_divergence(strength: Strength, confirmed: bool) -> Divergence {
        Divergence {
            kind: Trend::Bearish,
            strength,
            confirmed,
            price_first: 100.0,
            price_second: 105.0,
            indicator_first: 75.0,
            indicator_second: 65.0,
            bars_ago: 3,
        }
    }

    #[test]
    fn rsi_buckets() {
        let cfg = AltConfig::medium();
        let mut ind = base();
        for (rsi, expected) in [(90.0, 12.0), (81.0, 9.0), (73.0, 6.0), (63.0, 3.0), (50.0, 0.0)] {
            ind.rsi.value = rsi;
            assert_eq!(momentum_score(&ind, &cfg), expected, "rsi {rsi}");
        }
        ind.rsi.value = 20.0;
        ind.macd.trend = Trend::Bearish;
        // -8 oversold + 5 bearish MACD floors at zero
        assert_eq!(momentum_score(&ind, &cfg), 0.0);
    }

    #[test]
    fn momentum_is_capped() {
        let cfg = AltConfig::medium();
        let mut ind = base();
        ind.rsi.value = 95.0;
        ind.stoch_rsi.cross = Crossover::Bearish;
        ind.stoch_rsi.d = 90.0;
        ind.macd.trend = Trend::Bearish;
        ind.macd.crossover = Crossover::Bearish;
        ind.adx.signal = Trend::Bearish;
        ind.adx.trend_strength = TrendStrength::Strong;
        assert_eq!(momentum_score(&ind, &cfg), MOMENTUM_CAP);
    }

    #[test]
    fn price_action_buckets() {
        let cfg = AltConfig::medium();
        let mut ind = base();
        ind.bollinger.position = 93.0;
        ind.vwap.deviation_pct = 6.0;
        assert_eq!(price_action_score(&ind, 25.0, &cfg), 20.0);
        ind.vwap.deviation_pct = -1.0;
        assert_eq!(price_action_score(&ind, 5.0, &cfg), 4.0 + 6.0 - 3.0);
        ind.bollinger.position = 10.0;
        assert_eq!(price_action_score(&ind, 0.0, &cfg), 0.0);
    }

    #[test]
    fn absent_context_scores_zero_present_neutral_does_not() {
        let cfg = AltConfig::medium();
        let empty = MarketContext::default();
        assert_eq!(sentiment_score(&empty, &cfg), 0.0);
        assert_eq!(derivatives_score(&empty, 5.0, &cfg), 0.0);

        let neutral = MarketContext {
            funding_rate: Some(0.0),
            open_interest: Some(1_000_000.0),
            oi_change_24h: Some(0.0),
            long_short_ratio: PositioningRatio::from_pcts(51.0, 49.0),
            ..MarketContext::default()
        };
        assert_eq!(sentiment_score(&neutral, &cfg), 1.0);
        assert_eq!(derivatives_score(&neutral, 5.0, &cfg), 2.0);
    }

    #[test]
    fn funding_trend_shifts_bucket() {
        let cfg = AltConfig::medium();
        let rising = MarketContext {
            funding_rate: Some(0.0006),
            funding_rate_history: Some(vec![0.0001, 0.0001, 0.0005, 0.0006]),
            ..MarketContext::default()
        };
        assert_eq!(derivatives_score(&rising, 5.0, &cfg), FUNDING_HIGH_PTS + FUNDING_TREND_PTS);

        let falling = MarketContext {
            funding_rate: Some(0.0006),
            funding_rate_history: Some(vec![0.0009, 0.0009, 0.0004, 0.0003]),
            ..MarketContext::default()
        };
        assert_eq!(derivatives_score(&falling, 5.0, &cfg), FUNDING_HIGH_PTS - FUNDING_TREND_PTS);
    }

    #[test]
    fn divergence_rewards_confirmation() {
        let cfg = AltConfig::medium();
        let mut ind = base();
        let none = divergence_score(&ind, None, &cfg);
        ind.rsi_divergence.bearish = Some(bearish_divergence(Strength::Strong, false));
        let unconfirmed = divergence_score(&ind, None, &cfg);
        ind.rsi_divergence.bearish = Some(bearish_divergence(Strength::Strong, true));
        let confirmed = divergence_score(&ind, None, &cfg);
        assert!(none < unconfirmed && unconfirmed < confirmed);
        assert_eq!(confirmed, 8.0);
    }

    #[test]
    fn fake_pump_needs_minimum_confidence() {
        let cfg = AltConfig::medium();
        let mut ind = base();
        ind.fake_pump.is_fake = true;
        ind.fake_pump.confidence = 50.0;
        assert_eq!(divergence_score(&ind, None, &cfg), 0.0);
        ind.fake_pump.confidence = 100.0;
        assert_eq!(divergence_score(&ind, None, &cfg), FAKE_PUMP_MAX_PTS);
    }

    #[test]
    fn risk_bands() {
        let cfg = AltConfig::medium();
        let clean = CriticalAdjustments::default();
        assert_eq!(risk_level(75.0, &clean, &cfg), RiskLevel::Low);
        assert_eq!(risk_level(55.0, &clean, &cfg), RiskLevel::Medium);
        assert_eq!(risk_level(45.0, &clean, &cfg), RiskLevel::Medium);
        assert_eq!(risk_level(30.0, &clean, &cfg), RiskLevel::High);

        let penalised = CriticalAdjustments {
            penalties: 10.0,
            penalty_count: 1,
            ..CriticalAdjustments::default()
        };
        assert_eq!(risk_level(75.0, &penalised, &cfg), RiskLevel::Medium);
        assert_eq!(risk_level(45.0, &penalised, &cfg), RiskLevel::High);
    }

    #[test]
    fn decision_thresholds() {
        let cfg = AltConfig::medium();
        assert_eq!(decide(65.0, &cfg), ScoreDecision::Enter);
        assert_eq!(decide(50.0, &cfg), ScoreDecision::Watch);
        assert_eq!(decide(49.9, &cfg), ScoreDecision::Skip);
    }

    #[test]
    fn empty_indicators_stay_in_range() {
        let cfg = AltConfig::aggressive();
        let s = score_short(&Indicators::default(), &MarketContext::default(), None, &cfg);
        assert!((0.0..=100.0).contains(&s.total));
        assert_eq!(s.setup_type, SetupType::Speculative);
        assert_eq!(s.decision, ScoreDecision::Skip);
    }

    #[test]
    fn context_price_change_preferred() {
        let ind = base();
        let ctx = MarketContext {
            price_change_24h: Some(12.0),
            ..MarketContext::default()
        };
        assert_eq!(effective_price_change(&ind, &ctx), 12.0);
        assert_eq!(effective_price_change(&ind, &MarketContext::default()), 4.0);
    }
}
