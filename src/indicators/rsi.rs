// src/indicators/rsi.rs
use super::IndicatorError;

/// Relative Strength Index over a simple rolling mean of gains and losses.
///
/// Position `i` averages the `period` deltas ending at `i`, so the first
/// `period` positions are `None`. A window without losses reads 100, a window
/// without any movement reads 50.
pub fn rsi(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(period));
    }

    let mut values = vec![None; closes.len()];
    if closes.len() <= period {
        return Ok(values);
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|pair| {
            let delta = pair[1] - pair[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    // deltas[j] is the move into closes[j + 1]
    for i in period..closes.len() {
        let window = (i - period)..i;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[window].iter().sum::<f64>() / period as f64;
        values[i] = Some(relative_strength_index(avg_gain, avg_loss));
    }

    Ok(values)
}

fn relative_strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_positions_are_undefined() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let values = rsi(&closes, 14).unwrap();
        assert_eq!(values.len(), closes.len());
        assert!(values[..14].iter().all(Option::is_none));
        assert!(values[14..].iter().all(Option::is_some));
    }

    #[test]
    fn insufficient_data_yields_nothing() {
        let values = rsi(&[100.0, 102.0, 101.0], 14).unwrap();
        assert!(values.iter().all(Option::is_none));
    }

    #[test]
    fn strictly_rising_closes_read_100() {
        let closes: Vec<f64> = (0..15).map(|i| 1.0 + i as f64 * 0.01).collect();
        let values = rsi(&closes, 14).unwrap();
        assert_eq!(values[14], Some(100.0));
    }

    #[test]
    fn strictly_falling_closes_read_0() {
        let closes: Vec<f64> = (0..30).map(|i| 50.0 - i as f64).collect();
        let values = rsi(&closes, 14).unwrap();
        assert_eq!(values[29], Some(0.0));
    }

    #[test]
    fn flat_closes_are_neutral() {
        let values = rsi(&[1.0; 30], 14).unwrap();
        assert_eq!(values[29], Some(50.0));
    }

    #[test]
    fn known_window() {
        let closes = vec![
            44.0, 44.25, 44.5, 43.75, 44.0, 44.5, 45.0, 45.5, 45.25, 45.5, 46.0, 46.5, 46.25,
            46.0, 46.5,
        ];
        // gains: 0.25+0.25+0.25+0.5+0.5+0.5+0.25+0.5+0.5+0.5 = 4.0
        // losses: 0.75+0.25+0.25+0.25 = 1.5
        let value = rsi(&closes, 14).unwrap()[14].unwrap();
        let expected = 100.0 - 100.0 / (1.0 + 4.0 / 1.5);
        assert!((value - expected).abs() < 1e-9);
    }

    #[test]
    fn stays_within_bounds() {
        let closes: Vec<f64> = (0..100)
            .map(|i| 10.0 + ((i * 7919) % 13) as f64 * 0.3 - (i % 5) as f64)
            .collect();
        for value in rsi(&closes, 14).unwrap().into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value));
        }
    }
}
