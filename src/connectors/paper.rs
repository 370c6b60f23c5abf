// src/connectors/paper.rs
use crate::connectors::traits::ExchangeClient;
use crate::types::{Candle, OrderResponse, Side, SymbolFilters, Ticker};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Live market data, simulated fills. Orders execute in full against an
/// in-memory ledger, at the last price this exchange quoted for the symbol.
pub struct PaperExchange<E> {
    market: E,
    quote_asset: String,
    balances: Mutex<HashMap<String, Decimal>>,
    last_quotes: Mutex<HashMap<String, Decimal>>,
}

impl<E: ExchangeClient> PaperExchange<E> {
    pub fn new(market: E, quote_asset: impl Into<String>, starting_balance: Decimal) -> Self {
        let quote_asset = quote_asset.into();
        let balances = HashMap::from([(quote_asset.clone(), starting_balance)]);
        Self {
            market,
            quote_asset,
            balances: Mutex::new(balances),
            last_quotes: Mutex::new(HashMap::new()),
        }
    }

    /// The price the caller last saw; only falls back to the market when the
    /// symbol was never quoted.
    async fn fill_price(&self, symbol: &str) -> Result<Decimal> {
        let quoted = self
            .last_quotes
            .lock()
            .map_err(|_| anyhow!("paper quote cache lock poisoned"))?
            .get(symbol)
            .copied();
        match quoted {
            Some(price) => Ok(price),
            None => Ok(self.market.fetch_price(symbol).await?.price),
        }
    }

    fn base_asset<'a>(&self, symbol: &'a str) -> Result<&'a str> {
        symbol
            .strip_suffix(self.quote_asset.as_str())
            .filter(|base| !base.is_empty())
            .ok_or_else(|| anyhow!("{} is not quoted in {}", symbol, self.quote_asset))
    }
}

#[async_trait]
impl<E: ExchangeClient> ExchangeClient for PaperExchange<E> {
    async fn get_balance(&self, asset: &str) -> Result<Decimal> {
        let balances = self
            .balances
            .lock()
            .map_err(|_| anyhow!("paper ledger lock poisoned"))?;
        Ok(balances.get(asset).copied().unwrap_or_default())
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Ticker> {
        let ticker = self.market.fetch_price(symbol).await?;
        self.last_quotes
            .lock()
            .map_err(|_| anyhow!("paper quote cache lock poisoned"))?
            .insert(symbol.to_string(), ticker.price);
        Ok(ticker)
    }

    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: u16) -> Result<Vec<Candle>> {
        self.market.fetch_candles(symbol, interval, limit).await
    }

    async fn symbol_filters(&self, symbol: &str) -> Result<SymbolFilters> {
        self.market.symbol_filters(symbol).await
    }

    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResponse> {
        if quantity <= Decimal::ZERO {
            bail!("Refusing to send {} order with quantity {}", side, quantity);
        }
        let base = self.base_asset(symbol)?.to_string();
        let price = self.fill_price(symbol).await?;
        let notional = quantity * price;

        {
            let mut balances = self
                .balances
                .lock()
                .map_err(|_| anyhow!("paper ledger lock poisoned"))?;
            let quote_free = balances.get(&self.quote_asset).copied().unwrap_or_default();
            let base_free = balances.get(&base).copied().unwrap_or_default();

            let (quote_after, base_after) = match side {
                Side::Buy if quote_free < notional => {
                    bail!("insufficient paper {}: {} < {}", self.quote_asset, quote_free, notional)
                }
                Side::Sell if base_free < quantity => {
                    bail!("insufficient paper {}: {} < {}", base, base_free, quantity)
                }
                Side::Buy => (quote_free - notional, base_free + quantity),
                Side::Sell => (quote_free + notional, base_free - quantity),
            };
            balances.insert(self.quote_asset.clone(), quote_after);
            balances.insert(base.clone(), base_after);
        }

        info!(
            "📝 Paper {}: {} {} @ {} (Notional: {} {})",
            side, quantity, symbol, price, notional, self.quote_asset
        );

        Ok(OrderResponse {
            id: format!("paper-{}", Uuid::new_v4()),
            symbol: symbol.to_string(),
            status: "FILLED".to_string(),
            executed_qty: quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::mock::MockExchange;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn paper(price: &str) -> PaperExchange<MockExchange> {
        let market = MockExchange::default();
        market.set_price(dec(price));
        PaperExchange::new(market, "USDT", dec("10"))
    }

    #[tokio::test]
    async fn buy_then_sell_moves_the_ledger() {
        let exchange = paper("0.5");

        let order = exchange
            .place_market_order("SHIBUSDT", Side::Buy, dec("4"))
            .await
            .unwrap();
        assert_eq!(order.executed_qty, dec("4"));
        assert_eq!(exchange.get_balance("USDT").await.unwrap(), dec("8"));
        assert_eq!(exchange.get_balance("SHIB").await.unwrap(), dec("4"));

        exchange.market.set_price(dec("1"));
        exchange
            .place_market_order("SHIBUSDT", Side::Sell, dec("4"))
            .await
            .unwrap();
        assert_eq!(exchange.get_balance("USDT").await.unwrap(), dec("12"));
        assert_eq!(exchange.get_balance("SHIB").await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn fills_at_the_last_quoted_price() {
        let exchange = paper("0.5");
        exchange.fetch_price("SHIBUSDT").await.unwrap();
        exchange.market.set_price(dec("1"));

        exchange
            .place_market_order("SHIBUSDT", Side::Buy, dec("4"))
            .await
            .unwrap();
        assert_eq!(exchange.get_balance("USDT").await.unwrap(), dec("8"));

        exchange.fetch_price("SHIBUSDT").await.unwrap();
        exchange.market.set_price(dec("3"));
        exchange
            .place_market_order("SHIBUSDT", Side::Sell, dec("4"))
            .await
            .unwrap();
        assert_eq!(exchange.get_balance("USDT").await.unwrap(), dec("12"));
    }

    #[tokio::test]
    async fn rejects_orders_the_ledger_cannot_cover() {
        let exchange = paper("1");
        assert!(exchange
            .place_market_order("SHIBUSDT", Side::Buy, dec("11"))
            .await
            .is_err());
        assert!(exchange
            .place_market_order("SHIBUSDT", Side::Sell, dec("1"))
            .await
            .is_err());
        assert_eq!(exchange.get_balance("USDT").await.unwrap(), dec("10"));
    }

    #[tokio::test]
    async fn rejects_foreign_quote() {
        let exchange = paper("1");
        assert!(exchange
            .place_market_order("ETHBTC", Side::Buy, dec("1"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn market_data_comes_from_the_wrapped_client() {
        let exchange = paper("0.25");
        let ticker = exchange.fetch_price("SHIBUSDT").await.unwrap();
        assert_eq!(ticker.price, dec("0.25"));
        assert!(exchange.market.orders().is_empty());
    }
}
