use serde::{Deserialize, Serialize};

use crate::indicators::atr::atr_pct_over;
use crate::indicators::roc::price_change_pct;
use crate::market_data::{closes, finite_or, Candle};

// Windows on hourly candles.
pub const WINDOW_24H: usize = 24;
pub const WINDOW_7D: usize = 168;
pub const WINDOW_14D: usize = 336;

/// Below this many candles every ATR window collapses to the whole series.
pub const MIN_CANDLES_FOR_WINDOWS: usize = 50;

const VOLATILE_ATR_PCT: f64 = 5.0;

/// Multi-window volatility, price and volume metrics for tier scoring.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VolatilityMetrics {
    /// ATR over the window, in percent of the last close.
    pub atr_24h: f64,
    pub atr_7d: f64,
    pub atr_14d: f64,
    pub price_change_24h: f64,
    pub avg_volume: f64,
    pub current_volume: f64,
    pub volume_ratio: f64,
    pub is_volatile: bool,
    pub current_price: f64,
    pub candle_count: usize,
}

impl VolatilityMetrics {
    pub fn from_candles(candles: &[Candle]) -> Self {
        let n = candles.len();
        let (atr_24h, atr_7d, atr_14d) = if n < MIN_CANDLES_FOR_WINDOWS {
            let all = atr_pct_over(candles, n.saturating_sub(1));
            (all, all, all)
        } else {
            (
                atr_pct_over(candles, WINDOW_24H),
                atr_pct_over(candles, WINDOW_7D),
                atr_pct_over(candles, WINDOW_14D),
            )
        };

        let closes = closes(candles);
        let mut metrics = Self {
            atr_24h,
            atr_7d,
            atr_14d,
            price_change_24h: price_change_pct(&closes, WINDOW_24H),
            current_price: closes.last().map_or(0.0, |p| finite_or(*p, 0.0).max(0.0)),
            candle_count: n,
            ..Self::default()
        };
        metrics.is_volatile = metrics.weighted_atr() > VOLATILE_ATR_PCT;
        metrics.refresh_volume(candles);
        metrics
    }

    /// 0.5 * 24h + 0.3 * 7d + 0.2 * 14d.
    pub fn weighted_atr(&self) -> f64 {
        0.5 * self.atr_24h + 0.3 * self.atr_7d + 0.2 * self.atr_14d
    }

    /// Recompute the live volume fields from `candles`.
    ///
    /// `avg_volume` is the mean of up to 24 bars before the latest one;
    /// the ratio is 1.0 when there is no history or the average is zero.
    pub fn refresh_volume(&mut self, candles: &[Candle]) {
        let n = candles.len();
        self.current_volume = candles.last().map_or(0.0, |c| finite_or(c.volume, 0.0).max(0.0));

        if n < 2 {
            self.avg_volume = self.current_volume;
            self.volume_ratio = 1.0;
            return;
        }

        let history = &candles[n - 1 - WINDOW_24H.min(n - 1)..n - 1];
        let avg = history.iter().map(|c| finite_or(c.volume, 0.0)).sum::<f64>() / history.len() as f64;
        self.avg_volume = avg;
        self.volume_ratio = if avg > 0.0 {
            finite_or(self.current_volume / avg, 1.0)
        } else {
            1.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steady(n: usize, price: f64, range_pct: f64) -> Vec<Candle> {
        let half = price * range_pct / 200.0;
        (0..n)
            .map(|i| Candle::new(i as i64, price, price + half, price - half, price, 100.0))
            .collect()
    }

    #[test]
    fn empty_metrics() {
        let m = VolatilityMetrics::from_candles(&[]);
        assert_eq!(m.candle_count, 0);
        assert_eq!(m.current_price, 0.0);
        assert_eq!(m.volume_ratio, 1.0);
        assert_eq!(m.weighted_atr(), 0.0);
        assert!(!m.is_volatile);
    }

    #[test]
    fn short_history_collapses_windows() {
        let m = VolatilityMetrics::from_candles(&steady(30, 10.0, 4.0));
        assert_eq!(m.atr_24h, m.atr_7d);
        assert_eq!(m.atr_7d, m.atr_14d);
        assert!((m.atr_24h - 4.0).abs() < 1e-9);
    }

    #[test]
    fn long_history_uses_windows() {
        let mut candles = steady(300, 10.0, 2.0);
        let tail = steady(24, 10.0, 10.0);
        candles.extend(tail);
        let m = VolatilityMetrics::from_candles(&candles);
        assert!(m.atr_24h > m.atr_7d);
        assert!(m.atr_7d > m.atr_14d);
        assert!(m.is_volatile);
    }

    #[test]
    fn volume_spike_ratio() {
        let mut candles = steady(30, 10.0, 2.0);
        if let Some(last) = candles.last_mut() {
            last.volume = 1_500.0;
        }
        let m = VolatilityMetrics::from_candles(&candles);
        assert!((m.volume_ratio - 15.0).abs() < 1e-10);
        assert_eq!(m.current_volume, 1_500.0);
        assert_eq!(m.avg_volume, 100.0);
    }
}
