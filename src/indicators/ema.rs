// src/indicators/ema.rs
use super::IndicatorError;
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

/// Exponential moving average with `k = 2 / (span + 1)`, seeded by the first
/// value. One output per input.
pub fn ema(series: &[f64], span: usize) -> Result<Vec<f64>, IndicatorError> {
    let mut ema =
        ExponentialMovingAverage::new(span).map_err(|_| IndicatorError::InvalidPeriod(span))?;
    Ok(series.iter().map(|&value| ema.next(value)).collect())
}
