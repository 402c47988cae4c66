// =============================================================================
// Rate of Change (ROC) — price change over a look-back
// =============================================================================
//
// ROC measures the percentage change in price over a look-back period:
//   ROC = ((close - close_n) / close_n) * 100
//
// `price_change_pct` is the variant used for "24h change": when the series is
// shorter than the look-back it measures from the first available close.

/// Calculate the Rate of Change for the given closing prices and period.
///
/// Returns a vector of ROC values, one per close starting at index `period`.
/// A zero reference close yields 0.0 for that bar.
pub fn calculate_roc(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(closes.len() - period);
    for i in period..closes.len() {
        let prev = closes[i - period];
        if prev == 0.0 {
            result.push(0.0);
        } else {
            result.push(((closes[i] - prev) / prev) * 100.0);
        }
    }
    result
}

/// Return the most recent ROC value.
pub fn current_roc(closes: &[f64], period: usize) -> Option<f64> {
    calculate_roc(closes, period).last().copied()
}

/// Percent change of the last close versus `lookback` bars earlier, or versus
/// the first close when the series is shorter. 0.0 for fewer than two closes
/// or a zero reference.
pub fn price_change_pct(closes: &[f64], lookback: usize) -> f64 {
    if closes.len() < 2 || lookback == 0 {
        return 0.0;
    }
    let period = lookback.min(closes.len() - 1);
    current_roc(closes, period)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roc_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let roc = calculate_roc(&closes, 14);
        assert!(!roc.is_empty());
        // From 1 to 15: ROC = (15-1)/1 * 100 = 1400%
        assert!((roc[0] - 1400.0).abs() < 1e-10);
    }

    #[test]
    fn roc_insufficient_data() {
        assert!(calculate_roc(&[1.0, 2.0, 3.0], 14).is_empty());
    }

    #[test]
    fn price_change_falls_back_to_first_close() {
        let closes = vec![100.0, 105.0, 110.0];
        assert!((price_change_pct(&closes, 24) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn price_change_degenerate() {
        assert_eq!(price_change_pct(&[], 24), 0.0);
        assert_eq!(price_change_pct(&[5.0], 24), 0.0);
        assert_eq!(price_change_pct(&[0.0, 5.0], 24), 0.0);
    }
}
