// src/strategies/signals.rs
use crate::indicators::IndicatorSnapshot;
use std::fmt;

/// A single indicator's opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Sell,
    Neutral,
    Buy,
}

impl Vote {
    pub fn value(self) -> i8 {
        match self {
            Vote::Sell => -1,
            Vote::Neutral => 0,
            Vote::Buy => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiThresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiThresholds {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

/// Votes of the four indicator rules, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalVector {
    pub ema_trend: Vote,
    pub rsi: Vote,
    pub macd: Vote,
    pub bollinger: Vote,
}

impl SignalVector {
    pub fn from_snapshot(snapshot: &IndicatorSnapshot, thresholds: &RsiThresholds) -> Self {
        let ema_trend = if snapshot.ema_fast > snapshot.ema_slow {
            Vote::Buy
        } else {
            Vote::Sell
        };

        let rsi = if snapshot.rsi < thresholds.oversold {
            Vote::Buy
        } else if snapshot.rsi > thresholds.overbought {
            Vote::Sell
        } else {
            Vote::Neutral
        };

        let macd = if snapshot.macd > snapshot.macd_signal {
            Vote::Buy
        } else {
            Vote::Sell
        };

        let bollinger = if snapshot.close < snapshot.lower_band {
            Vote::Buy
        } else if snapshot.close > snapshot.upper_band {
            Vote::Sell
        } else {
            Vote::Neutral
        };

        Self {
            ema_trend,
            rsi,
            macd,
            bollinger,
        }
    }

    pub fn votes(&self) -> [Vote; 4] {
        [self.ema_trend, self.rsi, self.macd, self.bollinger]
    }

    /// Unweighted sum of the votes, always within [-4, 4].
    pub fn total(&self) -> i8 {
        self.votes().iter().map(|v| v.value()).sum()
    }
}

impl fmt::Display for SignalVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [ema, rsi, macd, bb] = self.votes().map(Vote::value);
        write!(f, "[ema {ema:+}, rsi {rsi:+}, macd {macd:+}, bb {bb:+}] = {:+}", self.total())
    }
}
