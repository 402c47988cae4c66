// =============================================================================
// Critical adjustments — bonuses and penalties applied after the categories
// =============================================================================
//
// Each rule is independent.  Several re-examine a fact a category already
// scored (RSI oversold is -8 in momentum and again a penalty here; a strong
// RSI feeds both momentum and the perfect-setup bonus).  That stacking is
// kept as is.

use serde::{Deserialize, Serialize};

use crate::alt_config::AltConfig;
use crate::futures_intel::MarketContext;
use crate::indicators::Indicators;
use crate::mtf_analysis::MtfAnalysis;

/// Sum of the critical layer with its audit trail.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CriticalAdjustments {
    /// Positive total of applied bonuses.
    pub bonuses: f64,
    /// Positive total of applied penalties.
    pub penalties: f64,
    pub penalty_count: usize,
    /// One line per applied rule, e.g. `"Perfect setup: RSI 81.2, BB 94% (+5)"`.
    pub applied: Vec<String>,
    /// Long ratio and top-trader short share agree on a crowded long.
    pub perfect_sentiment: bool,
    pub perfect_setup: bool,
}

impl CriticalAdjustments {
    fn bonus(&mut self, amount: f64, reason: String) {
        if amount > 0.0 {
            self.bonuses += amount;
            self.applied.push(format!("{reason} (+{amount})"));
        }
    }

    fn penalty(&mut self, amount: f64, reason: String) {
        if amount > 0.0 {
            self.penalties += amount;
            self.penalty_count += 1;
            self.applied.push(format!("{reason} (-{amount})"));
        }
    }

    /// Bonuses minus penalties.
    pub fn net(&self) -> f64 {
        self.bonuses - self.penalties
    }
}

/// Evaluate every critical rule.
///
/// `price_change` is the 24h change the price-action category used; `mtf` is
/// `None` when no multi-timeframe data was available.
pub fn evaluate_adjustments(
    ind: &Indicators,
    ctx: &MarketContext,
    mtf: Option<&MtfAnalysis>,
    price_change: f64,
    cfg: &AltConfig,
) -> CriticalAdjustments {
    let a = &cfg.adjustments;
    let mut out = CriticalAdjustments::default();

    let rsi = ind.rsi.value;
    let bb = ind.bollinger.position;
    let long_short = ctx.long_short();
    let top_traders = ctx.top_traders();

    // --- Bonuses -----------------------------------------------------------

    if let (Some(ls), Some(tt)) = (long_short, top_traders) {
        if ls.long_pct >= cfg.long_short.perfect_long && tt.short_pct >= cfg.top_traders.perfect_short {
            out.perfect_sentiment = true;
            out.bonus(
                a.perfect_sentiment,
                format!(
                    "Perfect sentiment: longs {:.1}%, top traders short {:.1}%",
                    ls.long_pct, tt.short_pct
                ),
            );
        }
    }

    if rsi >= cfg.rsi.strong && bb >= cfg.bollinger.very_high && price_change >= cfg.price_change.moderate {
        out.perfect_setup = true;
        out.bonus(
            a.perfect_setup,
            format!("Perfect setup: RSI {rsi:.1}, BB {bb:.0}%, change {price_change:+.1}%"),
        );
    }

    if ind.rsi_divergence.bearish_confirmed() || ind.macd_divergence.bearish_confirmed() {
        out.bonus(a.confirmed_divergence, "Confirmed bearish divergence".to_string());
    }

    if ind.fake_pump.is_fake && ind.fake_pump.confidence >= a.fake_pump_high_threshold {
        out.bonus(
            a.fake_pump_high_confidence,
            format!("Fake pump {:.0}% confidence", ind.fake_pump.confidence),
        );
    }

    if let Some(m) = mtf {
        if m.score >= cfg.multi_tf.strong_alignment {
            out.bonus(a.strong_mtf, format!("Strong bearish MTF alignment {:.0}", m.score));
        }
    }

    let ask_share = ctx.order_book.and_then(|b| b.ask_share_pct());
    if let Some(share) = ask_share {
        if share >= a.ask_heavy_share {
            out.bonus(a.ask_heavy_book, format!("Ask-heavy book {share:.0}% asks"));
        }
    }

    let long_liq_share = ctx.liquidation_heatmap.and_then(|h| h.long_share_pct());
    if let Some(share) = long_liq_share {
        if share >= a.long_liq_share {
            out.bonus(a.long_liq_heavy, format!("Long liquidations {share:.0}% of nearby"));
        }
    }

    // --- Penalties ---------------------------------------------------------

    if rsi <= cfg.rsi.oversold {
        out.penalty(a.rsi_oversold, format!("RSI oversold {rsi:.1}"));
    }

    if let Some(tt) = top_traders {
        if tt.short_pct <= cfg.top_traders.long_heavy {
            out.penalty(
                a.top_traders_long,
                format!("Top traders long-heavy, short {:.1}%", tt.short_pct),
            );
        }
    }

    if let Some(funding) = ctx.funding(cfg.funding.trend_tolerance) {
        if funding.annualized_pct <= -cfg.funding.extreme_annualized {
            out.penalty(
                a.extreme_funding,
                format!("Extreme negative funding {:.0}% annualised", funding.annualized_pct),
            );
        }
    }

    if price_change < cfg.price_change.minimum {
        out.penalty(
            a.insufficient_move,
            format!(
                "Insufficient move {price_change:+.1}% < {:.1}%",
                cfg.price_change.minimum
            ),
        );
    }

    if ind.rsi_divergence.strong_bullish() || ind.macd_divergence.strong_bullish() {
        out.penalty(a.strong_bullish_divergence, "Strong bullish divergence".to_string());
    }

    if bb < cfg.bollinger.low {
        out.penalty(a.low_bollinger, format!("Low Bollinger position {bb:.0}%"));
    }

    if let Some(m) = mtf {
        if m.score <= cfg.multi_tf.bullish_alignment {
            out.penalty(a.bullish_mtf, format!("Bullish MTF alignment {:.0}", m.score));
        }
    }

    if let Some(share) = ask_share {
        if share <= 100.0 - a.ask_heavy_share {
            out.penalty(a.bid_heavy_book, format!("Bid-heavy book {:.0}% bids", 100.0 - share));
        }
    }

    if let Some(share) = long_liq_share {
        if share <= 100.0 - a.long_liq_share {
            out.penalty(
                a.short_liq_heavy,
                format!("Short liquidations {:.0}% of nearby", 100.0 - share),
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::futures_intel::{LiquidationHeatmap, OrderBookSummary, PositioningRatio};

    fn neutral_indicators() -> Indicators {
        let mut ind = Indicators::default();
        ind.rsi.value = 55.0;
        ind.bollinger.position = 60.0;
        ind
    }

    #[test]
    fn nothing_fires_on_neutral_input() {
        let cfg = AltConfig::medium();
        let adj = evaluate_adjustments(&neutral_indicators(), &MarketContext::default(), None, 6.0, &cfg);
        assert_eq!(adj.bonuses, 0.0);
        assert_eq!(adj.penalties, 0.0);
        assert!(adj.applied.is_empty());
    }

    #[test]
    fn perfect_sentiment_and_setup() {
        let cfg = AltConfig::medium();
        let mut ind = neutral_indicators();
        ind.rsi.value = 82.0;
        ind.bollinger.position = 95.0;
        let ctx = MarketContext {
            long_short_ratio: PositioningRatio::from_pcts(64.0, 36.0),
            top_traders_ratio: PositioningRatio::from_pcts(40.0, 60.0),
            ..MarketContext::default()
        };
        let adj = evaluate_adjustments(&ind, &ctx, None, 12.0, &cfg);
        assert!(adj.perfect_sentiment);
        assert!(adj.perfect_setup);
        assert_eq!(adj.bonuses, 10.0);
        assert_eq!(adj.penalty_count, 0);
    }

    #[test]
    fn order_flow_skews_cut_both_ways() {
        let cfg = AltConfig::medium();
        let ask_heavy = MarketContext {
            order_book: Some(OrderBookSummary { bid_depth: 30.0, ask_depth: 70.0 }),
            liquidation_heatmap: Some(LiquidationHeatmap {
                long_liquidations: 80.0,
                short_liquidations: 20.0,
            }),
            ..MarketContext::default()
        };
        let adj = evaluate_adjustments(&neutral_indicators(), &ask_heavy, None, 6.0, &cfg);
        assert_eq!(adj.bonuses, 6.0);
        assert_eq!(adj.penalties, 0.0);

        let bid_heavy = MarketContext {
            order_book: Some(OrderBookSummary { bid_depth: 70.0, ask_depth: 30.0 }),
            liquidation_heatmap: Some(LiquidationHeatmap {
                long_liquidations: 20.0,
                short_liquidations: 80.0,
            }),
            ..MarketContext::default()
        };
        let adj = evaluate_adjustments(&neutral_indicators(), &bid_heavy, None, 6.0, &cfg);
        assert_eq!(adj.bonuses, 0.0);
        assert_eq!(adj.penalties, 6.0);
        assert_eq!(adj.penalty_count, 2);
    }

    #[test]
    fn small_move_and_oversold_are_penalised() {
        let cfg = AltConfig::medium();
        let mut ind = neutral_indicators();
        ind.rsi.value = 20.0;
        ind.bollinger.position = 10.0;
        let adj = evaluate_adjustments(&ind, &MarketContext::default(), None, 0.5, &cfg);
        let a = &cfg.adjustments;
        assert_eq!(adj.penalties, a.rsi_oversold + a.insufficient_move + a.low_bollinger);
        assert_eq!(adj.penalty_count, 3);
        assert!(adj.net() < 0.0);
    }

    #[test]
    fn extreme_negative_funding_penalised() {
        let cfg = AltConfig::medium();
        // -0.1% per 8h = -109.5% a year
        let ctx = MarketContext {
            funding_rate: Some(-0.001),
            ..MarketContext::default()
        };
        let adj = evaluate_adjustments(&neutral_indicators(), &ctx, None, 6.0, &cfg);
        assert_eq!(adj.penalties, cfg.adjustments.extreme_funding);
    }

    #[test]
    fn mtf_alignment_bonus_and_penalty() {
        let cfg = AltConfig::medium();
        let strong = MtfAnalysis {
            score: crate::mtf_analysis::MAX_ALIGNMENT_SCORE,
            ..MtfAnalysis::default()
        };
        let adj = evaluate_adjustments(&neutral_indicators(), &MarketContext::default(), Some(&strong), 6.0, &cfg);
        assert_eq!(adj.bonuses, cfg.adjustments.strong_mtf);

        let bullish = MtfAnalysis {
            score: 20.0,
            ..MtfAnalysis::default()
        };
        let adj = evaluate_adjustments(&neutral_indicators(), &MarketContext::default(), Some(&bullish), 6.0, &cfg);
        assert_eq!(adj.penalties, cfg.adjustments.bullish_mtf);
    }
}
