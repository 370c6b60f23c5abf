// src/indicators/mod.rs
//! Indicator engine: EMA, RSI, MACD and Bollinger Bands over candle closes.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

use crate::config::StrategyConfig;
use crate::types::Candle;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

pub use bollinger::bollinger;
pub use macd::macd;
pub use rsi::rsi;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: need {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("invalid indicator period {0}")]
    InvalidPeriod(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
}

impl IndicatorParams {
    pub fn required_candles(&self) -> usize {
        self.ema_slow.max(self.bb_period).max(self.rsi_period + 1)
    }
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self::from(&StrategyConfig::default())
    }
}

impl From<&StrategyConfig> for IndicatorParams {
    fn from(config: &StrategyConfig) -> Self {
        Self {
            ema_fast: config.ema_fast,
            ema_slow: config.ema_slow,
            macd_signal: config.macd_signal,
            rsi_period: config.rsi_period,
            bb_period: config.bb_period,
            bb_std_dev: config.bb_std_dev,
        }
    }
}

/// Every indicator value at one candle position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub sma: f64,
    pub stddev: f64,
    pub upper_band: f64,
    pub lower_band: f64,
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .map(|c| c.close.to_f64().unwrap_or_default())
        .collect()
}

/// One snapshot per close. Positions inside any indicator's warmup are `None`.
pub fn snapshot_series(
    closes: &[f64],
    params: &IndicatorParams,
) -> Result<Vec<Option<IndicatorSnapshot>>, IndicatorError> {
    let macd_points = macd(closes, params.ema_fast, params.ema_slow, params.macd_signal)?;
    let rsi_values = rsi(closes, params.rsi_period)?;
    let bands = bollinger(closes, params.bb_period, params.bb_std_dev)?;
    let required = params.required_candles();

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            if i + 1 < required {
                return None;
            }
            let m = macd_points[i];
            let rsi = rsi_values[i]?;
            let band = bands[i]?;
            Some(IndicatorSnapshot {
                close,
                ema_fast: m.ema_fast,
                ema_slow: m.ema_slow,
                rsi,
                macd: m.macd,
                macd_signal: m.signal,
                sma: band.sma,
                stddev: band.stddev,
                upper_band: band.upper,
                lower_band: band.lower,
            })
        })
        .collect())
}

/// Snapshot at the most recent close.
pub fn latest_snapshot(
    closes: &[f64],
    params: &IndicatorParams,
) -> Result<IndicatorSnapshot, IndicatorError> {
    let insufficient = IndicatorError::InsufficientData {
        required: params.required_candles(),
        available: closes.len(),
    };
    if closes.len() < params.required_candles() {
        return Err(insufficient);
    }
    snapshot_series(closes, params)?
        .pop()
        .flatten()
        .ok_or(insufficient)
}
