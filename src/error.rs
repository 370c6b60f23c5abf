// src/error.rs
use crate::core::position::PositionError;
use crate::indicators::IndicatorError;
use crate::types::Side;
use thiserror::Error;

/// Why a symbol was skipped for one polling tick. None of these stop the loop.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("failed to fetch {what} for {symbol}: {reason:#}")]
    DataFetch {
        symbol: String,
        what: &'static str,
        reason: anyhow::Error,
    },

    #[error("{side} order for {symbol} failed: {reason:#}")]
    Order {
        symbol: String,
        side: Side,
        reason: anyhow::Error,
    },

    #[error("no signal for {symbol}: {source}")]
    InsufficientData {
        symbol: String,
        #[source]
        source: IndicatorError,
    },

    #[error(transparent)]
    Position(#[from] PositionError),
}

impl TickError {
    pub fn data_fetch(symbol: &str, what: &'static str, reason: anyhow::Error) -> Self {
        TickError::DataFetch {
            symbol: symbol.to_string(),
            what,
            reason,
        }
    }

    pub fn order(symbol: &str, side: Side, reason: anyhow::Error) -> Self {
        TickError::Order {
            symbol: symbol.to_string(),
            side,
            reason,
        }
    }
}
