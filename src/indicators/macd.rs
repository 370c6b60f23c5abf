// src/indicators/macd.rs
use super::ema::ema;
use super::IndicatorError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd: f64,
    pub signal: f64,
}

/// MACD line (fast EMA minus slow EMA) and its EMA signal line.
pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<Vec<MacdPoint>, IndicatorError> {
    let ema_fast = ema(closes, fast)?;
    let ema_slow = ema(closes, slow)?;
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = ema(&line, signal)?;

    Ok((0..closes.len())
        .map(|i| MacdPoint {
            ema_fast: ema_fast[i],
            ema_slow: ema_slow[i],
            macd: line[i],
            signal: signal_line[i],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_market_has_zero_macd() {
        let points = macd(&[1.0; 30], 12, 26, 9).unwrap();
        assert_eq!(points.len(), 30);
        let last = points[29];
        assert_eq!(last.ema_fast, last.ema_slow);
        assert_eq!(last.macd, 0.0);
        assert_eq!(last.signal, 0.0);
    }

    #[test]
    fn rally_pushes_fast_above_slow() {
        let mut closes = vec![1.0; 40];
        closes.extend((1..=10).map(|i| 1.0 + i as f64 * 0.05));
        let last = *macd(&closes, 12, 26, 9).unwrap().last().unwrap();
        assert!(last.ema_fast > last.ema_slow);
        assert!(last.macd > 0.0);
        assert!(last.macd > last.signal);
    }
}
