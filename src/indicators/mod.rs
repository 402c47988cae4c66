// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the short-setup
// scorer consumes.  Low-level `calculate_*` functions return `Vec<f64>` or
// `Option<T>`; the `analyze_*` / `detect_*` functions never fail and fall back
// to a neutral reading when the series is shorter than the indicator needs.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod divergence;
pub mod ema;
pub mod fake_pump;
pub mod macd;
pub mod obv;
pub mod patterns;
pub mod roc;
pub mod rsi;
pub mod snapshot;
pub mod stoch_rsi;
pub mod vwap;

pub use snapshot::Indicators;
