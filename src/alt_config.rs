// =============================================================================
// Alt Config — per-tier scoring thresholds
// =============================================================================
//
// Three threshold sets, one per volatility tier:
//
//   tier 1  conservative   large caps, small moves are meaningful
//   tier 2  medium
//   tier 3  aggressive     micro caps, only big moves are meaningful
//
// Every numeric threshold moves in one direction from tier 1 to tier 3
// (non-decreasing or non-increasing).  `ConfigSet::validate` enforces that
// together with the internal ordering of each table, so a hand-edited file
// cannot silently invert a bucket.
//
// Persisted as JSON with an atomic tmp+rename write.  Missing fields of a
// tier fall back to that tier's built-in set.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::mtf_analysis::MAX_ALIGNMENT_SCORE;
use crate::tier::VolatilityTier;

// =============================================================================
// Threshold tables
// =============================================================================

/// 24h price change buckets, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceChangeThresholds {
    /// Below this the move is too small to short.
    pub minimum: f64,
    pub moderate: f64,
    pub strong: f64,
    pub extreme: f64,
}

impl Default for PriceChangeThresholds {
    fn default() -> Self {
        Self {
            minimum: 3.0,
            moderate: 5.0,
            strong: 10.0,
            extreme: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiThresholds {
    pub extreme: f64,
    pub strong: f64,
    pub overbought: f64,
    pub elevated: f64,
    pub weak: f64,
    pub oversold: f64,
}

impl Default for RsiThresholds {
    fn default() -> Self {
        Self {
            extreme: 88.0,
            strong: 80.0,
            overbought: 72.0,
            elevated: 62.0,
            weak: 42.0,
            oversold: 28.0,
        }
    }
}

/// Position inside the bands, 0 = lower, 100 = upper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerThresholds {
    pub very_high: f64,
    pub high: f64,
    pub elevated: f64,
    pub low: f64,
}

impl Default for BollingerThresholds {
    fn default() -> Self {
        Self {
            very_high: 92.0,
            high: 82.0,
            elevated: 68.0,
            low: 25.0,
        }
    }
}

/// Deviation above VWAP, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VwapThresholds {
    pub extreme: f64,
    pub strong: f64,
    pub moderate: f64,
}

impl Default for VwapThresholds {
    fn default() -> Self {
        Self {
            extreme: 5.0,
            strong: 3.0,
            moderate: 1.5,
        }
    }
}

/// Funding rate in percent per 8h interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingThresholds {
    pub extreme: f64,
    pub high: f64,
    pub elevated: f64,
    pub extreme_negative: f64,
    /// Annualised percent; funding at or below the negative of this is a
    /// crowded short.
    pub extreme_annualized: f64,
    /// Half-on-half mean change, in percentage points, that counts as a trend.
    pub trend_tolerance: f64,
}

impl Default for FundingThresholds {
    fn default() -> Self {
        Self {
            extreme: 0.08,
            high: 0.05,
            elevated: 0.02,
            extreme_negative: -0.05,
            extreme_annualized: 80.0,
            trend_tolerance: 0.002,
        }
    }
}

/// Retail account long share, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongShortThresholds {
    pub extreme: f64,
    pub high: f64,
    pub moderate: f64,
    pub short_heavy: f64,
    pub extreme_short: f64,
    /// Long share that, together with shorting top traders, is the ideal
    /// crowd split.
    pub perfect_long: f64,
}

impl Default for LongShortThresholds {
    fn default() -> Self {
        Self {
            extreme: 68.0,
            high: 62.0,
            moderate: 56.0,
            short_heavy: 43.0,
            extreme_short: 33.0,
            perfect_long: 60.0,
        }
    }
}

/// Top-trader short share, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopTradersThresholds {
    pub extreme: f64,
    pub high: f64,
    pub moderate: f64,
    pub long_heavy: f64,
    pub extreme_long: f64,
    pub perfect_short: f64,
}

impl Default for TopTradersThresholds {
    fn default() -> Self {
        Self {
            extreme: 63.0,
            high: 58.0,
            moderate: 54.0,
            long_heavy: 38.0,
            extreme_long: 28.0,
            perfect_short: 55.0,
        }
    }
}

/// 24h open-interest change, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenInterestThresholds {
    pub strong_increase: f64,
    pub increase: f64,
    pub decrease: f64,
}

impl Default for OpenInterestThresholds {
    fn default() -> Self {
        Self {
            strong_increase: 15.0,
            increase: 5.0,
            decrease: -8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringThresholds {
    /// Total at or above which the setup is actionable.
    pub enter: f64,
    pub watch: f64,
    pub risk_low: f64,
    pub risk_medium: f64,
    pub risk_medium_fallback: f64,
    /// Penalty sum below which the fallback medium band applies.
    pub risk_penalty_tolerance: f64,
    pub fake_pump_min_confidence: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            enter: 65.0,
            watch: 50.0,
            risk_low: 70.0,
            risk_medium: 52.0,
            risk_medium_fallback: 42.0,
            risk_penalty_tolerance: 8.0,
            fake_pump_min_confidence: 55.0,
        }
    }
}

/// Bearish alignment score buckets.  The aggregator tops out at
/// `mtf_analysis::MAX_ALIGNMENT_SCORE`, so `strong_alignment` must stay at or
/// below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiTfThresholds {
    pub strong_alignment: f64,
    /// At or below this the higher timeframes lean bullish.
    pub bullish_alignment: f64,
}

impl Default for MultiTfThresholds {
    fn default() -> Self {
        Self {
            strong_alignment: 70.0,
            bullish_alignment: 32.0,
        }
    }
}

/// Volume ratio (last bar / recent average) buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeThresholds {
    pub spike: f64,
    pub high: f64,
    pub elevated: f64,
}

impl Default for VolumeThresholds {
    fn default() -> Self {
        Self {
            spike: 3.0,
            high: 2.0,
            elevated: 1.5,
        }
    }
}

/// Entry-timing bucket levels on the fastest timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryTimingThresholds {
    pub rsi_extreme: f64,
    pub rsi_strong: f64,
    pub rsi_elevated: f64,
    pub rsi_warm: f64,
    /// StochRSI %D a bearish cross must start from.
    pub stoch_cross_from: f64,
    pub bollinger_extreme: f64,
    pub bollinger_high: f64,
    pub bollinger_elevated: f64,
    /// Distance above EMA200, in percent.
    pub ema200_far: f64,
    pub ema200_stretched: f64,
    /// Upper wick as a fraction of the last closed candle's range.
    pub wick_rejection: f64,
    pub wick_strong: f64,
    pub wick_visible: f64,
    /// Bearish over bullish volume across the last five candles.
    pub pressure_heavy: f64,
    pub pressure_high: f64,
    pub pressure_balanced: f64,
    /// State machine cut-offs on the total.
    pub enter_now: f64,
    pub ready: f64,
    pub early: f64,
}

impl Default for EntryTimingThresholds {
    fn default() -> Self {
        Self {
            rsi_extreme: 80.0,
            rsi_strong: 70.0,
            rsi_elevated: 60.0,
            rsi_warm: 50.0,
            stoch_cross_from: 80.0,
            bollinger_extreme: 95.0,
            bollinger_high: 85.0,
            bollinger_elevated: 75.0,
            ema200_far: 15.0,
            ema200_stretched: 8.0,
            wick_rejection: 0.6,
            wick_strong: 0.4,
            wick_visible: 0.25,
            pressure_heavy: 2.0,
            pressure_high: 1.5,
            pressure_balanced: 1.0,
            enter_now: 70.0,
            ready: 55.0,
            early: 40.0,
        }
    }
}

/// Point amounts and trigger levels for the critical adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentAmounts {
    // --- Bonuses -----------------------------------------------------------
    pub perfect_sentiment: f64,
    pub perfect_setup: f64,
    pub confirmed_divergence: f64,
    pub fake_pump_high_confidence: f64,
    pub strong_mtf: f64,
    pub ask_heavy_book: f64,
    pub long_liq_heavy: f64,

    // --- Penalties ---------------------------------------------------------
    pub rsi_oversold: f64,
    pub top_traders_long: f64,
    pub extreme_funding: f64,
    pub insufficient_move: f64,
    pub strong_bullish_divergence: f64,
    pub low_bollinger: f64,
    pub bullish_mtf: f64,
    pub bid_heavy_book: f64,
    pub short_liq_heavy: f64,

    // --- Trigger levels ----------------------------------------------------
    /// Fake-pump confidence for the high-confidence bonus.
    pub fake_pump_high_threshold: f64,
    /// Ask share of visible depth, in percent.
    pub ask_heavy_share: f64,
    /// Long share of nearby liquidations, in percent.
    pub long_liq_share: f64,
}

impl Default for AdjustmentAmounts {
    fn default() -> Self {
        Self {
            perfect_sentiment: 5.0,
            perfect_setup: 5.0,
            confirmed_divergence: 4.0,
            fake_pump_high_confidence: 5.0,
            strong_mtf: 3.0,
            ask_heavy_book: 3.0,
            long_liq_heavy: 3.0,
            rsi_oversold: 10.0,
            top_traders_long: 6.0,
            extreme_funding: 5.0,
            insufficient_move: 5.0,
            strong_bullish_divergence: 6.0,
            low_bollinger: 4.0,
            bullish_mtf: 5.0,
            bid_heavy_book: 3.0,
            short_liq_heavy: 3.0,
            fake_pump_high_threshold: 75.0,
            ask_heavy_share: 60.0,
            long_liq_share: 65.0,
        }
    }
}

// =============================================================================
// AltConfig
// =============================================================================

/// Complete threshold set for one volatility tier.
///
/// `Default` is the medium (tier 2) set.  The standalone table defaults are
/// the medium values too, except `VolumeThresholds`, which defaults to the
/// tier-independent 3.0 / 2.0 / 1.5 baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AltConfig {
    pub price_change: PriceChangeThresholds,
    pub rsi: RsiThresholds,
    pub bollinger: BollingerThresholds,
    pub vwap: VwapThresholds,
    pub funding: FundingThresholds,
    pub long_short: LongShortThresholds,
    pub top_traders: TopTradersThresholds,
    pub open_interest: OpenInterestThresholds,
    pub scoring: ScoringThresholds,
    pub multi_tf: MultiTfThresholds,
    pub volume: VolumeThresholds,
    pub entry_timing: EntryTimingThresholds,
    pub adjustments: AdjustmentAmounts,
}

impl AltConfig {
    /// Tier 1: large caps.
    pub fn conservative() -> Self {
        Self {
            price_change: PriceChangeThresholds {
                minimum: 1.5,
                moderate: 3.0,
                strong: 6.0,
                extreme: 10.0,
            },
            rsi: RsiThresholds {
                extreme: 85.0,
                strong: 78.0,
                overbought: 70.0,
                elevated: 60.0,
                weak: 45.0,
                oversold: 30.0,
            },
            bollinger: BollingerThresholds {
                very_high: 90.0,
                high: 80.0,
                elevated: 65.0,
                low: 30.0,
            },
            vwap: VwapThresholds {
                extreme: 3.0,
                strong: 2.0,
                moderate: 1.0,
            },
            funding: FundingThresholds {
                extreme: 0.05,
                high: 0.03,
                elevated: 0.01,
                extreme_negative: -0.03,
                extreme_annualized: 50.0,
                trend_tolerance: 0.002,
            },
            long_short: LongShortThresholds {
                extreme: 70.0,
                high: 65.0,
                moderate: 58.0,
                short_heavy: 45.0,
                extreme_short: 35.0,
                perfect_long: 60.0,
            },
            top_traders: TopTradersThresholds {
                extreme: 65.0,
                high: 60.0,
                moderate: 55.0,
                long_heavy: 40.0,
                extreme_long: 30.0,
                perfect_short: 55.0,
            },
            open_interest: OpenInterestThresholds {
                strong_increase: 10.0,
                increase: 3.0,
                decrease: -5.0,
            },
            scoring: ScoringThresholds {
                enter: 70.0,
                watch: 55.0,
                risk_low: 75.0,
                risk_medium: 55.0,
                fake_pump_min_confidence: 60.0,
                ..ScoringThresholds::default()
            },
            multi_tf: MultiTfThresholds {
                strong_alignment: 72.5,
                bullish_alignment: 30.0,
            },
            volume: VolumeThresholds {
                spike: 3.0,
                high: 2.0,
                elevated: 1.5,
            },
            entry_timing: EntryTimingThresholds::default(),
            adjustments: AdjustmentAmounts::default(),
        }
    }

    /// Tier 2: mid caps.
    pub fn medium() -> Self {
        Self {
            price_change: PriceChangeThresholds::default(),
            rsi: RsiThresholds::default(),
            bollinger: BollingerThresholds::default(),
            vwap: VwapThresholds::default(),
            funding: FundingThresholds::default(),
            long_short: LongShortThresholds::default(),
            top_traders: TopTradersThresholds::default(),
            open_interest: OpenInterestThresholds::default(),
            scoring: ScoringThresholds::default(),
            multi_tf: MultiTfThresholds::default(),
            volume: VolumeThresholds {
                spike: 3.5,
                high: 2.25,
                elevated: 1.6,
            },
            entry_timing: EntryTimingThresholds::default(),
            adjustments: AdjustmentAmounts::default(),
        }
    }

    /// Tier 3: micro caps and new listings.
    pub fn aggressive() -> Self {
        Self {
            price_change: PriceChangeThresholds {
                minimum: 5.0,
                moderate: 10.0,
                strong: 20.0,
                extreme: 40.0,
            },
            rsi: RsiThresholds {
                extreme: 90.0,
                strong: 83.0,
                overbought: 75.0,
                elevated: 65.0,
                weak: 40.0,
                oversold: 25.0,
            },
            bollinger: BollingerThresholds {
                very_high: 95.0,
                high: 85.0,
                elevated: 70.0,
                low: 20.0,
            },
            vwap: VwapThresholds {
                extreme: 8.0,
                strong: 5.0,
                moderate: 2.5,
            },
            funding: FundingThresholds {
                extreme: 0.10,
                high: 0.07,
                elevated: 0.03,
                extreme_negative: -0.08,
                extreme_annualized: 100.0,
                trend_tolerance: 0.002,
            },
            long_short: LongShortThresholds {
                extreme: 65.0,
                high: 60.0,
                moderate: 55.0,
                short_heavy: 40.0,
                extreme_short: 30.0,
                perfect_long: 60.0,
            },
            top_traders: TopTradersThresholds {
                extreme: 60.0,
                high: 56.0,
                moderate: 52.0,
                long_heavy: 35.0,
                extreme_long: 25.0,
                perfect_short: 55.0,
            },
            open_interest: OpenInterestThresholds {
                strong_increase: 25.0,
                increase: 8.0,
                decrease: -12.0,
            },
            scoring: ScoringThresholds {
                enter: 60.0,
                watch: 45.0,
                risk_low: 65.0,
                risk_medium: 48.0,
                fake_pump_min_confidence: 50.0,
                ..ScoringThresholds::default()
            },
            multi_tf: MultiTfThresholds {
                strong_alignment: 67.5,
                bullish_alignment: 35.0,
            },
            volume: VolumeThresholds {
                spike: 4.0,
                high: 2.5,
                elevated: 1.75,
            },
            entry_timing: EntryTimingThresholds::default(),
            adjustments: AdjustmentAmounts::default(),
        }
    }

    pub fn for_tier(tier: VolatilityTier) -> Self {
        match tier {
            VolatilityTier::Low => Self::conservative(),
            VolatilityTier::Medium => Self::medium(),
            VolatilityTier::High => Self::aggressive(),
        }
    }

    /// Every numeric field as `(dotted name, value)`, in a stable order.
    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        let p = &self.price_change;
        let r = &self.rsi;
        let b = &self.bollinger;
        let v = &self.vwap;
        let f = &self.funding;
        let ls = &self.long_short;
        let tt = &self.top_traders;
        let oi = &self.open_interest;
        let s = &self.scoring;
        let m = &self.multi_tf;
        let vol = &self.volume;
        let e = &self.entry_timing;
        let a = &self.adjustments;
        vec![
            ("price_change.minimum", p.minimum),
            ("price_change.moderate", p.moderate),
            ("price_change.strong", p.strong),
            ("price_change.extreme", p.extreme),
            ("rsi.extreme", r.extreme),
            ("rsi.strong", r.strong),
            ("rsi.overbought", r.overbought),
            ("rsi.elevated", r.elevated),
            ("rsi.weak", r.weak),
            ("rsi.oversold", r.oversold),
            ("bollinger.very_high", b.very_high),
            ("bollinger.high", b.high),
            ("bollinger.elevated", b.elevated),
            ("bollinger.low", b.low),
            ("vwap.extreme", v.extreme),
            ("vwap.strong", v.strong),
            ("vwap.moderate", v.moderate),
            ("funding.extreme", f.extreme),
            ("funding.high", f.high),
            ("funding.elevated", f.elevated),
            ("funding.extreme_negative", f.extreme_negative),
            ("funding.extreme_annualized", f.extreme_annualized),
            ("funding.trend_tolerance", f.trend_tolerance),
            ("long_short.extreme", ls.extreme),
            ("long_short.high", ls.high),
            ("long_short.moderate", ls.moderate),
            ("long_short.short_heavy", ls.short_heavy),
            ("long_short.extreme_short", ls.extreme_short),
            ("long_short.perfect_long", ls.perfect_long),
            ("top_traders.extreme", tt.extreme),
            ("top_traders.high", tt.high),
            ("top_traders.moderate", tt.moderate),
            ("top_traders.long_heavy", tt.long_heavy),
            ("top_traders.extreme_long", tt.extreme_long),
            ("top_traders.perfect_short", tt.perfect_short),
            ("open_interest.strong_increase", oi.strong_increase),
            ("open_interest.increase", oi.increase),
            ("open_interest.decrease", oi.decrease),
            ("scoring.enter", s.enter),
            ("scoring.watch", s.watch),
            ("scoring.risk_low", s.risk_low),
            ("scoring.risk_medium", s.risk_medium),
            ("scoring.risk_medium_fallback", s.risk_medium_fallback),
            ("scoring.risk_penalty_tolerance", s.risk_penalty_tolerance),
            ("scoring.fake_pump_min_confidence", s.fake_pump_min_confidence),
            ("multi_tf.strong_alignment", m.strong_alignment),
            ("multi_tf.bullish_alignment", m.bullish_alignment),
            ("volume.spike", vol.spike),
            ("volume.high", vol.high),
            ("volume.elevated", vol.elevated),
            ("entry_timing.rsi_extreme", e.rsi_extreme),
            ("entry_timing.rsi_strong", e.rsi_strong),
            ("entry_timing.rsi_elevated", e.rsi_elevated),
            ("entry_timing.rsi_warm", e.rsi_warm),
            ("entry_timing.stoch_cross_from", e.stoch_cross_from),
            ("entry_timing.bollinger_extreme", e.bollinger_extreme),
            ("entry_timing.bollinger_high", e.bollinger_high),
            ("entry_timing.bollinger_elevated", e.bollinger_elevated),
            ("entry_timing.ema200_far", e.ema200_far),
            ("entry_timing.ema200_stretched", e.ema200_stretched),
            ("entry_timing.wick_rejection", e.wick_rejection),
            ("entry_timing.wick_strong", e.wick_strong),
            ("entry_timing.wick_visible", e.wick_visible),
            ("entry_timing.pressure_heavy", e.pressure_heavy),
            ("entry_timing.pressure_high", e.pressure_high),
            ("entry_timing.pressure_balanced", e.pressure_balanced),
            ("entry_timing.enter_now", e.enter_now),
            ("entry_timing.ready", e.ready),
            ("entry_timing.early", e.early),
            ("adjustments.perfect_sentiment", a.perfect_sentiment),
            ("adjustments.perfect_setup", a.perfect_setup),
            ("adjustments.confirmed_divergence", a.confirmed_divergence),
            ("adjustments.fake_pump_high_confidence", a.fake_pump_high_confidence),
            ("adjustments.strong_mtf", a.strong_mtf),
            ("adjustments.ask_heavy_book", a.ask_heavy_book),
            ("adjustments.long_liq_heavy", a.long_liq_heavy),
            ("adjustments.rsi_oversold", a.rsi_oversold),
            ("adjustments.top_traders_long", a.top_traders_long),
            ("adjustments.extreme_funding", a.extreme_funding),
            ("adjustments.insufficient_move", a.insufficient_move),
            ("adjustments.strong_bullish_divergence", a.strong_bullish_divergence),
            ("adjustments.low_bollinger", a.low_bollinger),
            ("adjustments.bullish_mtf", a.bullish_mtf),
            ("adjustments.bid_heavy_book", a.bid_heavy_book),
            ("adjustments.short_liq_heavy", a.short_liq_heavy),
            ("adjustments.fake_pump_high_threshold", a.fake_pump_high_threshold),
            ("adjustments.ask_heavy_share", a.ask_heavy_share),
            ("adjustments.long_liq_share", a.long_liq_share),
        ]
    }

    /// Check the internal ordering of every table.
    pub fn validate(&self) -> Result<()> {
        if let Some((name, value)) = self.fields().into_iter().find(|(_, v)| !v.is_finite()) {
            bail!("{name} is not finite: {value}");
        }

        let p = &self.price_change;
        ensure_ascending("price_change", &[p.minimum, p.moderate, p.strong, p.extreme])?;

        let r = &self.rsi;
        ensure_ascending(
            "rsi",
            &[r.oversold, r.weak, r.elevated, r.overbought, r.strong, r.extreme],
        )?;

        let b = &self.bollinger;
        ensure_ascending("bollinger", &[b.low, b.elevated, b.high, b.very_high])?;

        let v = &self.vwap;
        ensure_ascending("vwap", &[0.0, v.moderate, v.strong, v.extreme])?;

        let f = &self.funding;
        ensure_ascending("funding", &[f.extreme_negative, 0.0, f.elevated, f.high, f.extreme])?;

        let ls = &self.long_short;
        ensure_ascending(
            "long_short",
            &[ls.extreme_short, ls.short_heavy, 50.0, ls.moderate, ls.high, ls.extreme],
        )?;

        let tt = &self.top_traders;
        ensure_ascending(
            "top_traders",
            &[tt.extreme_long, tt.long_heavy, 50.0, tt.moderate, tt.high, tt.extreme],
        )?;

        let oi = &self.open_interest;
        ensure_ascending("open_interest", &[oi.decrease, 0.0, oi.increase, oi.strong_increase])?;

        let s = &self.scoring;
        ensure_ascending("scoring (watch < enter)", &[s.watch, s.enter])?;
        ensure_ascending("scoring (risk bands)", &[s.risk_medium_fallback, s.risk_medium, s.risk_low])?;

        let m = &self.multi_tf;
        ensure_ascending("multi_tf", &[m.bullish_alignment, 50.0, m.strong_alignment])?;
        if m.strong_alignment > MAX_ALIGNMENT_SCORE {
            bail!(
                "multi_tf.strong_alignment {} is unreachable (max alignment score {})",
                m.strong_alignment,
                MAX_ALIGNMENT_SCORE
            );
        }

        let vol = &self.volume;
        ensure_ascending("volume", &[1.0, vol.elevated, vol.high, vol.spike])?;

        let e = &self.entry_timing;
        ensure_ascending("entry_timing.rsi", &[e.rsi_warm, e.rsi_elevated, e.rsi_strong, e.rsi_extreme])?;
        ensure_ascending(
            "entry_timing.bollinger",
            &[e.bollinger_elevated, e.bollinger_high, e.bollinger_extreme],
        )?;
        ensure_ascending("entry_timing.ema200", &[e.ema200_stretched, e.ema200_far])?;
        ensure_ascending("entry_timing.wick", &[0.0, e.wick_visible, e.wick_strong, e.wick_rejection])?;
        ensure_ascending(
            "entry_timing.pressure",
            &[e.pressure_balanced, e.pressure_high, e.pressure_heavy],
        )?;
        ensure_ascending("entry_timing.states", &[e.early, e.ready, e.enter_now])?;

        Ok(())
    }
}

fn ensure_ascending(table: &str, values: &[f64]) -> Result<()> {
    for pair in values.windows(2) {
        if pair[0] >= pair[1] {
            bail!("{table} thresholds out of order: {} >= {}", pair[0], pair[1]);
        }
    }
    Ok(())
}

impl Default for AltConfig {
    fn default() -> Self {
        Self::medium()
    }
}

// =============================================================================
// ConfigSet
// =============================================================================

/// The three tier configs, persisted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfigSet")]
pub struct ConfigSet {
    pub tier_1: AltConfig,
    pub tier_2: AltConfig,
    pub tier_3: AltConfig,
}

/// On-disk shape: each tier is a partial JSON object layered over the
/// built-in set for that tier.
#[derive(Deserialize)]
struct RawConfigSet {
    #[serde(default)]
    tier_1: Option<serde_json::Value>,
    #[serde(default)]
    tier_2: Option<serde_json::Value>,
    #[serde(default)]
    tier_3: Option<serde_json::Value>,
}

impl TryFrom<RawConfigSet> for ConfigSet {
    type Error = serde_json::Error;

    fn try_from(raw: RawConfigSet) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            tier_1: overlay(AltConfig::conservative(), raw.tier_1)?,
            tier_2: overlay(AltConfig::medium(), raw.tier_2)?,
            tier_3: overlay(AltConfig::aggressive(), raw.tier_3)?,
        })
    }
}

fn overlay(base: AltConfig, patch: Option<serde_json::Value>) -> serde_json::Result<AltConfig> {
    let Some(patch) = patch else {
        return Ok(base);
    };
    let mut merged = serde_json::to_value(base)?;
    merge_json(&mut merged, patch);
    serde_json::from_value(merged)
}

fn merge_json(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

impl Default for ConfigSet {
    fn default() -> Self {
        Self {
            tier_1: AltConfig::conservative(),
            tier_2: AltConfig::medium(),
            tier_3: AltConfig::aggressive(),
        }
    }
}

impl ConfigSet {
    pub fn get(&self, tier: VolatilityTier) -> &AltConfig {
        match tier {
            VolatilityTier::Low => &self.tier_1,
            VolatilityTier::Medium => &self.tier_2,
            VolatilityTier::High => &self.tier_3,
        }
    }

    /// Internal ordering of each tier plus cross-tier monotonicity of every
    /// field.
    pub fn validate(&self) -> Result<()> {
        for (label, cfg) in [("tier_1", &self.tier_1), ("tier_2", &self.tier_2), ("tier_3", &self.tier_3)] {
            cfg.validate().with_context(|| format!("{label} config invalid"))?;
        }

        let t1 = self.tier_1.fields();
        let t2 = self.tier_2.fields();
        let t3 = self.tier_3.fields();
        for ((name, a), ((_, b), (_, c))) in t1.into_iter().zip(t2.into_iter().zip(t3)) {
            let rising = a <= b && b <= c;
            let falling = a >= b && b >= c;
            if !rising && !falling {
                bail!("{name} is not monotonic across tiers: {a} / {b} / {c}");
            }
        }
        Ok(())
    }

    /// Load and validate a config set from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read alt config from {}", path.display()))?;

        let set: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse alt config from {}", path.display()))?;

        set.validate()
            .with_context(|| format!("alt config at {} rejected", path.display()))?;

        info!(
            path = %path.display(),
            enter_t1 = set.tier_1.scoring.enter,
            enter_t2 = set.tier_2.scoring.enter,
            enter_t3 = set.tier_3.scoring.enter,
            "alt config loaded"
        );

        Ok(set)
    }

    /// `load`, falling back to the built-in sets with a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(set) => set,
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{e:#}"), "using built-in alt config");
                Self::default()
            }
        }
    }

    /// Persist to `path` via a `.tmp` sibling and rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise alt config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "alt config saved (atomic)");
        Ok(())
    }
}
