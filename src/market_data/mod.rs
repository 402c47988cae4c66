pub mod candle;
pub mod timeframe;

// Re-export the core types for convenient access (e.g. `use crate::market_data::Candle`).
pub use candle::{closed_candles, closes, finite_or, pct_distance, Candle};
pub use timeframe::{Timeframe, TimeframeCandles};
