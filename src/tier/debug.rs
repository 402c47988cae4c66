use std::fmt::Write as _;

use super::TierResult;

/// Multi-line operational dump of a tier result.
///
/// Log consumers grep for the labels `TIER:`, `confidence:`, `Source:`,
/// `Volume:`, `SCORE BREAKDOWN` and `[NEW COIN]`; keep them verbatim.
pub fn format_tier_debug(symbol: &str, result: &TierResult) -> String {
    let m = &result.metrics;
    let mut out = String::new();

    let new_coin = if result.is_new_coin { " [NEW COIN]" } else { "" };
    let _ = writeln!(out, "=== {symbol} ===");
    let _ = writeln!(out, "TIER: {} ({}){new_coin}", result.tier.as_u8(), result.tier);
    let _ = writeln!(
        out,
        "Base tier: {} | Current tier: {}",
        result.base_tier.as_u8(),
        result.current_tier.as_u8()
    );
    let _ = writeln!(out, "Source: {}", result.source);
    let _ = writeln!(out, "confidence: {:.0}%", result.confidence);
    let _ = writeln!(out, "Price: {} | Candles: {}", m.current_price, m.candle_count);
    let _ = writeln!(
        out,
        "ATR: 24h {:.2}% | 7d {:.2}% | 14d {:.2}% | weighted {:.2}%",
        m.atr_24h,
        m.atr_7d,
        m.atr_14d,
        m.weighted_atr()
    );
    let _ = writeln!(out, "24h change: {:+.2}%", m.price_change_24h);
    let _ = writeln!(
        out,
        "Volume: current {:.2} | avg {:.2} | ratio {:.2}x{}",
        m.current_volume,
        m.avg_volume,
        m.volume_ratio,
        if result.volume_adjusted { " (tier raised by volume)" } else { "" }
    );
    let _ = writeln!(out, "SCORE BREAKDOWN (total {}):", result.score_factors.total_score);
    for line in &result.score_factors.breakdown {
        let _ = writeln!(out, "  - {line}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::{compute_tier, VolatilityTier};

    #[test]
    fn contains_every_marker() {
        let r = compute_tier(&[]);
        let text = format_tier_debug("NEWUSDT", &r);
        for marker in ["TIER:", "confidence:", "Source:", "Volume:", "SCORE BREAKDOWN", "[NEW COIN]"] {
            assert!(text.contains(marker), "missing {marker} in\n{text}");
        }
    }

    #[test]
    fn established_coin_has_no_new_tag() {
        let candles: Vec<_> = (0..150)
            .map(|i| crate::market_data::Candle::new(i, 10.0, 10.2, 9.8, 10.0, 5.0))
            .collect();
        let r = compute_tier(&candles);
        let text = format_tier_debug("OLDUSDT", &r);
        assert!(!text.contains("[NEW COIN]"));
        assert!(text.contains("Source: score"));
    }

    #[test]
    fn override_shows_source() {
        let r = compute_tier(&[]).with_override(VolatilityTier::High);
        let text = format_tier_debug("X", &r);
        assert!(text.contains("Source: override"));
        assert!(text.contains("TIER: 3 (HIGH)"));
    }
}
