// =============================================================================
// Indicator snapshot: every indicator computed once over one candle series
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::adx::{analyze_adx, AdxResult};
use crate::indicators::atr::{analyze_atr, AtrResult};
use crate::indicators::bollinger::{analyze_bollinger, BollingerResult};
use crate::indicators::divergence::{detect_macd_divergence, detect_rsi_divergence, DivergenceParams, DivergenceResult};
use crate::indicators::ema::{analyze_ema, EmaResult};
use crate::indicators::fake_pump::{detect_fake_pump, FakePumpResult};
use crate::indicators::macd::{analyze_macd, calculate_macd, MacdResult};
use crate::indicators::obv::{analyze_obv, ObvResult};
use crate::indicators::patterns::{detect_patterns, PatternAnalysis};
use crate::indicators::roc::price_change_pct;
use crate::indicators::rsi::{analyze_rsi, calculate_rsi, RsiResult, RSI_PERIOD};
use crate::indicators::stoch_rsi::{analyze_stoch_rsi, StochRsiResult};
use crate::indicators::vwap::{analyze_vwap, VwapResult};
use crate::market_data::{closes, finite_or, Candle};

/// Bars in the "24h" change on hourly candles.
pub const CHANGE_LOOKBACK: usize = 24;

/// Bars averaged for the volume ratio (excluding the latest bar).
pub const VOLUME_AVG_WINDOW: usize = 20;

/// One result per indicator kind, computed over the same candle series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub current_price: f64,
    pub price_change_24h: f64,
    pub volume_ratio: f64,
    pub candle_count: usize,

    pub rsi: RsiResult,
    pub macd: MacdResult,
    pub ema: EmaResult,
    pub bollinger: BollingerResult,
    pub adx: AdxResult,
    pub obv: ObvResult,
    pub stoch_rsi: StochRsiResult,
    pub vwap: VwapResult,
    pub atr: AtrResult,
    pub patterns: PatternAnalysis,
    pub fake_pump: FakePumpResult,
    pub rsi_divergence: DivergenceResult,
    pub macd_divergence: DivergenceResult,
}

impl Default for Indicators {
    /// Empty series: neutral readings and the 1.0 no-history volume ratio.
    fn default() -> Self {
        Self {
            current_price: 0.0,
            price_change_24h: 0.0,
            volume_ratio: 1.0,
            candle_count: 0,
            rsi: RsiResult::default(),
            macd: MacdResult::default(),
            ema: EmaResult::default(),
            bollinger: BollingerResult::default(),
            adx: AdxResult::default(),
            obv: ObvResult::default(),
            stoch_rsi: StochRsiResult::default(),
            vwap: VwapResult::default(),
            atr: AtrResult::default(),
            patterns: PatternAnalysis::default(),
            fake_pump: FakePumpResult::default(),
            rsi_divergence: DivergenceResult::default(),
            macd_divergence: DivergenceResult::default(),
        }
    }
}

impl Indicators {
    pub fn from_candles(candles: &[Candle]) -> Self {
        Self::with_params(candles, DivergenceParams::default())
    }

    pub fn with_params(candles: &[Candle], params: DivergenceParams) -> Self {
        let closes = closes(candles);

        let rsi = analyze_rsi(&closes);
        let ema = analyze_ema(&closes);
        let bollinger = analyze_bollinger(&closes);
        let fake_pump = detect_fake_pump(candles, &ema, &rsi, &bollinger);

        let rsi_series = calculate_rsi(&closes, RSI_PERIOD);
        let macd_series = calculate_macd(&closes);

        let snapshot = Self {
            current_price: closes.last().map_or(0.0, |p| finite_or(*p, 0.0)),
            price_change_24h: price_change_pct(&closes, CHANGE_LOOKBACK),
            volume_ratio: volume_ratio(candles, VOLUME_AVG_WINDOW),
            candle_count: candles.len(),
            rsi,
            macd: analyze_macd(&closes),
            ema,
            bollinger,
            adx: analyze_adx(candles),
            obv: analyze_obv(candles),
            stoch_rsi: analyze_stoch_rsi(&closes),
            vwap: analyze_vwap(candles),
            atr: analyze_atr(candles),
            patterns: detect_patterns(candles),
            fake_pump,
            rsi_divergence: detect_rsi_divergence(candles, &rsi_series, params),
            macd_divergence: detect_macd_divergence(candles, &macd_series.histogram, params),
        };

        debug!(
            candles = snapshot.candle_count,
            price = snapshot.current_price,
            rsi = format!("{:.1}", snapshot.rsi.value),
            macd_trend = %snapshot.macd.trend,
            ema_trend = %snapshot.ema.trend,
            bb_position = format!("{:.1}", snapshot.bollinger.position),
            patterns = snapshot.patterns.bearish.len(),
            fake_pump = snapshot.fake_pump.is_fake,
            "indicator snapshot computed"
        );

        snapshot
    }

    /// A bearish RSI or MACD divergence is present.
    pub fn has_bearish_divergence(&self) -> bool {
        self.rsi_divergence.has_bearish() || self.macd_divergence.has_bearish()
    }
}

/// Latest volume over the mean of the preceding `window` bars.
///
/// Returns 1.0 when there is no history or the average is zero.
pub fn volume_ratio(candles: &[Candle], window: usize) -> f64 {
    let n = candles.len();
    if n < 2 || window == 0 {
        return 1.0;
    }
    let history = &candles[n - 1 - window.min(n - 1)..n - 1];
    let avg = history.iter().map(|c| c.volume).sum::<f64>() / history.len() as f64;
    if avg <= 0.0 {
        return 1.0;
    }
    finite_or(candles[n - 1].volume / avg, 1.0)
}
