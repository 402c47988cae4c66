use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::candle::Candle;

// ---------------------------------------------------------------------------
// Timeframe
// ---------------------------------------------------------------------------

/// Candle intervals the pipeline understands, ordered fastest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::H1,
        Timeframe::H2,
        Timeframe::H4,
    ];

    /// Weight in the multi-timeframe alignment score. 5m is display-only.
    pub fn alignment_weight(self) -> f64 {
        match self {
            Self::H4 => 0.40,
            Self::H2 => 0.30,
            Self::H1 => 0.20,
            Self::M15 => 0.10,
            Self::M5 => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::H1 => "1h",
            Self::H2 => "2h",
            Self::H4 => "4h",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// TimeframeCandles -- one candle series per interval
// ---------------------------------------------------------------------------

/// Candle series for one symbol across up to five intervals.
///
/// The hourly series is the primary input for the indicator set and the
/// volatility tier; the fastest present series drives entry timing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeframeCandles {
    series: BTreeMap<Timeframe, Vec<Candle>>,
}

impl TimeframeCandles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the series for `timeframe`.
    pub fn insert(&mut self, timeframe: Timeframe, candles: Vec<Candle>) {
        self.series.insert(timeframe, candles);
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        self.insert(timeframe, candles);
        self
    }

    /// Candles for `timeframe`, or an empty slice when not supplied.
    pub fn get(&self, timeframe: Timeframe) -> &[Candle] {
        self.series.get(&timeframe).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, timeframe: Timeframe) -> bool {
        self.series.get(&timeframe).is_some_and(|c| !c.is_empty())
    }

    /// Timeframes that carry at least one candle, fastest first.
    pub fn timeframes(&self) -> impl Iterator<Item = Timeframe> + '_ {
        self.series
            .iter()
            .filter(|(_, candles)| !candles.is_empty())
            .map(|(tf, _)| *tf)
    }

    /// The hourly series, falling back to the slowest non-empty series.
    pub fn primary(&self) -> (Option<Timeframe>, &[Candle]) {
        if self.contains(Timeframe::H1) {
            return (Some(Timeframe::H1), self.get(Timeframe::H1));
        }
        match self.timeframes().last() {
            Some(tf) => (Some(tf), self.get(tf)),
            None => (None, &[]),
        }
    }

    /// The fastest non-empty series.
    pub fn fastest(&self) -> (Option<Timeframe>, &[Candle]) {
        match self.timeframes().next() {
            Some(tf) => (Some(tf), self.get(tf)),
            None => (None, &[]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timeframes().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::new(i as i64, 1.0, 1.0, 1.0, 1.0, 1.0))
            .collect()
    }

    #[test]
    fn weights_sum_to_one_without_5m() {
        let total: f64 = Timeframe::ALL.iter().map(|tf| tf.alignment_weight()).sum();
        assert!((total - 1.0).abs() < 1e-10);
        assert_eq!(Timeframe::M5.alignment_weight(), 0.0);
    }

    #[test]
    fn primary_prefers_hourly() {
        let set = TimeframeCandles::new()
            .with(Timeframe::M5, series(3))
            .with(Timeframe::H1, series(5))
            .with(Timeframe::H4, series(7));
        let (tf, candles) = set.primary();
        assert_eq!(tf, Some(Timeframe::H1));
        assert_eq!(candles.len(), 5);
    }

    #[test]
    fn primary_falls_back_to_slowest() {
        let set = TimeframeCandles::new()
            .with(Timeframe::M15, series(3))
            .with(Timeframe::H4, series(7))
            .with(Timeframe::H1, Vec::new());
        assert_eq!(set.primary().0, Some(Timeframe::H4));
        assert_eq!(set.fastest().0, Some(Timeframe::M15));
    }

    #[test]
    fn empty_set() {
        let set = TimeframeCandles::new();
        assert!(set.is_empty());
        assert_eq!(set.primary().0, None);
        assert!(set.get(Timeframe::H1).is_empty());
    }

    #[test]
    fn deserialises_interval_keys() {
        let json = r#"{"1h":[{"timestamp":1,"open":1.0,"high":1.0,"low":1.0,"close":1.0,"volume":1.0}]}"#;
        let set: TimeframeCandles = serde_json::from_str(json).unwrap();
        assert!(set.contains(Timeframe::H1));
    }
}
