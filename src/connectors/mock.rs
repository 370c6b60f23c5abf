// src/connectors/mock.rs
//! In-memory exchange for engine and paper-trading tests.
use crate::connectors::traits::ExchangeClient;
use crate::types::{Candle, OrderResponse, Side, SymbolFilters, Ticker};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    price: Decimal,
    candles: Vec<Candle>,
    balance: Decimal,
    filters: SymbolFilters,
    unreachable_symbols: HashSet<String>,
    balance_down: bool,
    reject_orders: bool,
    /// Overrides the reported fill; zero mimics an ACK-only response.
    executed_qty: Option<Decimal>,
    filter_calls: usize,
    orders: Vec<(String, Side, Decimal)>,
}

#[derive(Clone, Default)]
pub struct MockExchange {
    state: Arc<Mutex<MockState>>,
}

impl MockExchange {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn set_price(&self, price: Decimal) {
        self.state().price = price;
    }

    pub fn set_candles(&self, candles: Vec<Candle>) {
        self.state().candles = candles;
    }

    pub fn set_balance(&self, balance: Decimal) {
        self.state().balance = balance;
    }

    pub fn set_filters(&self, filters: SymbolFilters) {
        self.state().filters = filters;
    }

    pub fn set_unreachable(&self, symbol: &str) {
        self.state().unreachable_symbols.insert(symbol.to_string());
    }

    pub fn set_balance_down(&self, down: bool) {
        self.state().balance_down = down;
    }

    pub fn set_reject_orders(&self, reject: bool) {
        self.state().reject_orders = reject;
    }

    pub fn set_executed_qty(&self, executed: Option<Decimal>) {
        self.state().executed_qty = executed;
    }

    pub fn filter_calls(&self) -> usize {
        self.state().filter_calls
    }

    pub fn orders(&self) -> Vec<(String, Side, Decimal)> {
        self.state().orders.clone()
    }

    fn check_reachable(&self, symbol: &str) -> Result<()> {
        if self.state().unreachable_symbols.contains(symbol) {
            bail!("connection reset while fetching {}", symbol);
        }
        Ok(())
    }
}

#[async_trait]
impl ExchangeClient for MockExchange {
    async fn get_balance(&self, _asset: &str) -> Result<Decimal> {
        let state = self.state();
        if state.balance_down {
            return Err(anyhow!("account endpoint unavailable"));
        }
        Ok(state.balance)
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Ticker> {
        self.check_reachable(symbol)?;
        Ok(Ticker {
            symbol: symbol.to_string(),
            price: self.state().price,
            timestamp: 0,
        })
    }

    async fn fetch_candles(&self, symbol: &str, _interval: &str, limit: u16) -> Result<Vec<Candle>> {
        self.check_reachable(symbol)?;
        let state = self.state();
        let skip = state.candles.len().saturating_sub(usize::from(limit));
        Ok(state.candles[skip..].to_vec())
    }

    async fn symbol_filters(&self, symbol: &str) -> Result<SymbolFilters> {
        self.check_reachable(symbol)?;
        let mut state = self.state();
        state.filter_calls += 1;
        Ok(state.filters)
    }

    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResponse> {
        let mut state = self.state();
        if state.reject_orders {
            bail!("[-2010] Account has insufficient balance for requested action.");
        }
        state.orders.push((symbol.to_string(), side, quantity));
        Ok(OrderResponse {
            id: state.orders.len().to_string(),
            symbol: symbol.to_string(),
            status: "FILLED".to_string(),
            executed_qty: state.executed_qty.unwrap_or(quantity),
        })
    }
}
