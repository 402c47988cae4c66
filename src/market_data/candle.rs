use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

/// A single OHLCV candle as delivered by the exchange kline endpoint.
///
/// `is_closed` is `false` only for the bar that is still forming; snapshots
/// that omit the flag are treated as fully closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default = "default_true")]
    pub is_closed: bool,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            is_closed: true,
        }
    }

    /// Absolute body size.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// High-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Midpoint of the body.
    pub fn body_mid(&self) -> f64 {
        (self.open + self.close) / 2.0
    }

    /// (H + L + C) / 3, the price VWAP accumulates.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// True range against the previous close.
    pub fn true_range(&self, prev_close: f64) -> f64 {
        (self.high - self.low)
            .max((self.high - prev_close).abs())
            .max((self.low - prev_close).abs())
    }
}

/// Closing prices of `candles`, oldest first.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Candles whose bar has finished, oldest first.
pub fn closed_candles(candles: &[Candle]) -> Vec<Candle> {
    candles.iter().filter(|c| c.is_closed).copied().collect()
}

/// Replace a non-finite value with `fallback`.
///
/// Used at result boundaries so that NaN / infinity never escapes a public
/// indicator result.
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Percentage distance of `price` from `reference` (positive when above).
///
/// Returns 0.0 when the reference is zero or the result is non-finite.
pub fn pct_distance(price: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    finite_or((price - reference) / reference * 100.0, 0.0)
}
