// src/strategies/voting.rs
use crate::config::StrategyConfig;
use crate::indicators::{self, IndicatorError, IndicatorParams};
use crate::strategies::signals::{RsiThresholds, SignalVector};
use crate::strategies::traits::Strategy;
use crate::types::Candle;
use tracing::debug;

/// Sums EMA trend, RSI, MACD and Bollinger votes on the latest candle.
pub struct IndicatorVoting {
    params: IndicatorParams,
    thresholds: RsiThresholds,
}

impl IndicatorVoting {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            params: IndicatorParams::from(config),
            thresholds: RsiThresholds {
                oversold: config.rsi_oversold,
                overbought: config.rsi_overbought,
            },
        }
    }
}

impl Strategy for IndicatorVoting {
    fn name(&self) -> String {
        format!(
            "IndicatorVoting(ema {}/{}, rsi {}, macd {}, bb {}x{})",
            self.params.ema_fast,
            self.params.ema_slow,
            self.params.rsi_period,
            self.params.macd_signal,
            self.params.bb_period,
            self.params.bb_std_dev
        )
    }

    fn evaluate(&self, candles: &[Candle]) -> Result<SignalVector, IndicatorError> {
        let closes = indicators::closes(candles);
        let snapshot = indicators::latest_snapshot(&closes, &self.params)?;
        debug!(
            "ema {:.8}/{:.8} rsi {:.2} macd {:.8}/{:.8} bands {:.8}..{:.8}",
            snapshot.ema_fast,
            snapshot.ema_slow,
            snapshot.rsi,
            snapshot.macd,
            snapshot.macd_signal,
            snapshot.lower_band,
            snapshot.upper_band
        );
        Ok(SignalVector::from_snapshot(&snapshot, &self.thresholds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::signals::Vote;
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;

    fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let close = Decimal::from_f64(close).unwrap();
                Candle {
                    open_time: i as u64 * 60_000,
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: Decimal::ONE,
                }
            })
            .collect()
    }

    #[test]
    fn flat_market_does_not_buy() {
        let strategy = IndicatorVoting::new(&StrategyConfig::default());
        let signals = strategy.evaluate(&candles(&[1.0; 30])).unwrap();
        assert_eq!(signals.total(), -2);
    }

    #[test]
    fn oversold_drop_is_cancelled_by_trend_votes() {
        let mut closes = vec![1.0; 80];
        closes.extend((1..=19).map(|i| 1.0 - i as f64 * 0.001));
        closes.push(0.90);

        let strategy = IndicatorVoting::new(&StrategyConfig::default());
        let signals = strategy.evaluate(&candles(&closes)).unwrap();

        assert_eq!(
            signals.votes(),
            [Vote::Sell, Vote::Buy, Vote::Sell, Vote::Buy]
        );
        assert_eq!(signals.total(), 0);
    }

    #[test]
    fn short_history_is_insufficient() {
        let strategy = IndicatorVoting::new(&StrategyConfig::default());
        let err = strategy.evaluate(&candles(&[1.0; 10])).unwrap_err();
        assert!(matches!(err, IndicatorError::InsufficientData { available: 10, .. }));
    }
}
