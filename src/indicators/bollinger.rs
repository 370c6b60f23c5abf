// src/indicators/bollinger.rs
use super::IndicatorError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerPoint {
    pub sma: f64,
    pub stddev: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Bollinger Bands: SMA(window) ± k * sample standard deviation(window).
/// The first `window - 1` positions are `None`.
pub fn bollinger(
    closes: &[f64],
    window: usize,
    k: f64,
) -> Result<Vec<Option<BollingerPoint>>, IndicatorError> {
    // Sample deviation divides by window - 1.
    if window < 2 {
        return Err(IndicatorError::InvalidPeriod(window));
    }

    let mut points = vec![None; closes.len()];
    for (offset, slice) in closes.windows(window).enumerate() {
        let sma = slice.iter().sum::<f64>() / window as f64;
        let variance =
            slice.iter().map(|c| (c - sma).powi(2)).sum::<f64>() / (window - 1) as f64;
        let stddev = variance.sqrt();
        points[offset + window - 1] = Some(BollingerPoint {
            sma,
            stddev,
            upper: sma + k * stddev,
            lower: sma - k * stddev,
        });
    }

    Ok(points)
}
