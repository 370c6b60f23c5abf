// src/types.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub price: Decimal,
    pub timestamp: u64,
}

/// One kline; a window of them arrives oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: u64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Trading rules of a symbol, taken from the exchange's `LOT_SIZE` and
/// `NOTIONAL` filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolFilters {
    pub step_size: Decimal,
    pub min_quantity: Decimal,
    pub min_notional: Decimal,
}

impl SymbolFilters {
    /// Number of decimal digits a quantity may carry, implied by the step size.
    /// `0.00100000` -> 3, `1.00000000` -> 0.
    pub fn precision(&self) -> u32 {
        self.step_size.normalize().scale()
    }
}

impl Default for SymbolFilters {
    fn default() -> Self {
        Self {
            step_size: Decimal::new(1, 6),
            min_quantity: Decimal::new(1, 6),
            min_notional: Decimal::new(1, 4),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub symbol: String,
    pub status: String,
    pub executed_qty: Decimal,
}
