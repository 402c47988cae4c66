#![allow(dead_code)]

use short_radar::futures_intel::{MarketContext, PositioningRatio};
use short_radar::indicators::Indicators;
use short_radar::market_data::Candle;
use short_radar::types::Trend;

pub const HOUR_MS: i64 = 3_600_000;

/// `n` hourly candles drifting by `step_pct` per bar from `start`, each with
/// a high-low range of `range_pct` and constant `volume`.
pub fn drifting(n: usize, start: f64, step_pct: f64, range_pct: f64, volume: f64) -> Vec<Candle> {
    let mut close = start;
    (0..n)
        .map(|i| {
            let open = close;
            close *= 1.0 + step_pct / 100.0;
            let half = close * range_pct / 200.0;
            let high = open.max(close) + half;
            let low = (open.min(close) - half).max(0.0);
            Candle::new(i as i64 * HOUR_MS, open, high, low, close, volume)
        })
        .collect()
}

/// Overextended pump: flat base, then a steep run-up on the last bars.
pub fn pump(n: usize, start: f64, run_bars: usize, run_step_pct: f64) -> Vec<Candle> {
    let base = n.saturating_sub(run_bars);
    let mut candles = drifting(base, start, 0.05, 1.0, 1_000.0);
    let last = candles.last().map_or(start, |c| c.close);
    let run = drifting(run_bars.min(n), last, run_step_pct, 1.5, 1_800.0);
    let offset = candles.len() as i64;
    candles.extend(run.into_iter().map(|mut c| {
        c.timestamp += offset * HOUR_MS;
        c
    }));
    candles
}

/// Indicator set with a moderately bearish backdrop and RSI in the middle.
pub fn backdrop() -> Indicators {
    let mut ind = Indicators::default();
    ind.current_price = 1.0;
    ind.price_change_24h = 12.0;
    ind.rsi.value = 55.0;
    ind.bollinger.position = 85.0;
    ind.vwap.deviation_pct = 3.0;
    ind.macd.trend = Trend::Bearish;
    ind.obv.trend = Trend::Bearish;
    ind
}

/// Crowded-long derivatives context.
pub fn crowded_long() -> MarketContext {
    MarketContext {
        funding_rate: Some(0.0006),
        open_interest: Some(5_000_000.0),
        oi_change_24h: Some(12.0),
        long_short_ratio: PositioningRatio::from_pcts(66.0, 34.0),
        top_traders_ratio: PositioningRatio::from_pcts(41.0, 59.0),
        ..MarketContext::default()
    }
}
