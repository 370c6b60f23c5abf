// src/strategies/traits.rs
use crate::indicators::IndicatorError;
use crate::strategies::signals::SignalVector;
use crate::types::Candle;

pub trait Strategy: Send + Sync {
    fn name(&self) -> String;

    // Votes for the most recent candle; oldest candle first.
    fn evaluate(&self, candles: &[Candle]) -> Result<SignalVector, IndicatorError>;
}
