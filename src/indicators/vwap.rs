// =============================================================================
// Volume-Weighted Average Price (VWAP)
// =============================================================================
//
//   VWAP = sum(typical_price * volume) / sum(volume)
//
// accumulated over the full supplied window.  Deviation is the percent
// distance of the last close from VWAP (positive when price trades above).

use serde::{Deserialize, Serialize};

use crate::market_data::{finite_or, pct_distance, Candle};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VwapResult {
    pub vwap: f64,
    pub deviation_pct: f64,
}

impl VwapResult {
    pub fn is_above(&self) -> bool {
        self.deviation_pct > 0.0
    }
}

/// VWAP over all of `candles`; `None` when the window carries no volume.
pub fn calculate_vwap(candles: &[Candle]) -> Option<f64> {
    let (pv, vol) = candles.iter().fold((0.0_f64, 0.0_f64), |(pv, vol), c| {
        (pv + c.typical_price() * c.volume, vol + c.volume)
    });
    if vol <= 0.0 {
        return None;
    }
    let vwap = pv / vol;
    vwap.is_finite().then_some(vwap)
}

/// Zero cumulative volume falls back to the last close, so the deviation is 0.
pub fn analyze_vwap(candles: &[Candle]) -> VwapResult {
    let Some(last) = candles.last() else {
        return VwapResult::default();
    };
    let price = finite_or(last.close, 0.0);
    let vwap = calculate_vwap(candles).unwrap_or(price);
    VwapResult {
        vwap,
        deviation_pct: pct_distance(price, vwap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(analyze_vwap(&[]), VwapResult::default());
    }

    #[test]
    fn zero_volume_uses_last_close() {
        let candles = vec![
            Candle::new(0, 10.0, 11.0, 9.0, 10.0, 0.0),
            Candle::new(1, 10.0, 13.0, 10.0, 12.0, 0.0),
        ];
        let r = analyze_vwap(&candles);
        assert_eq!(r.vwap, 12.0);
        assert_eq!(r.deviation_pct, 0.0);
    }

    #[test]
    fn weights_by_volume() {
        let candles = vec![
            Candle::new(0, 10.0, 10.0, 10.0, 10.0, 1.0),
            Candle::new(1, 20.0, 20.0, 20.0, 20.0, 3.0),
        ];
        let r = analyze_vwap(&candles);
        assert!((r.vwap - 17.5).abs() < 1e-10);
        // 20 vs 17.5
        assert!((r.deviation_pct - 14.285714285714286).abs() < 1e-9);
        assert!(r.is_above());
    }
}
