// src/connectors/traits.rs
use crate::types::{Candle, OrderResponse, Side, SymbolFilters, Ticker};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Free balance of `asset`.
    async fn get_balance(&self, asset: &str) -> Result<Decimal>;

    async fn fetch_price(&self, symbol: &str) -> Result<Ticker>;

    /// The most recent `limit` klines, oldest first.
    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: u16) -> Result<Vec<Candle>>;

    // Lot size and notional rules for quantity rounding
    async fn symbol_filters(&self, symbol: &str) -> Result<SymbolFilters>;

    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResponse>;
}
