// src/connectors/binance.rs
use crate::connectors::messages::{
    BinanceAccountInfo, BinanceApiError, BinanceExchangeInfo, BinanceKline, BinanceOrderResponse,
    BinanceTickerPrice,
};
use crate::connectors::traits::ExchangeClient;
use crate::types::{Candle, OrderResponse, Side, SymbolFilters, Ticker};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, info};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const RECV_WINDOW_MS: &str = "5000";

pub struct BinanceClient {
    api_key: String,
    secret_key: String,
    http_client: Client,
    base_rest_url: String,
}

impl BinanceClient {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key,
            http_client: Client::new(),
            base_rest_url: "https://api.binance.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_rest_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn sign_and_build_query(&self, params: Vec<(&str, String)>) -> Result<String> {
        let mut params = params;
        let timestamp = Utc::now().timestamp_millis().to_string();
        params.push(("recvWindow", RECV_WINDOW_MS.to_string()));
        params.push(("timestamp", timestamp));

        let query_string = serde_urlencoded::to_string(&params)?;

        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .context("Invalid secret key length")?;
        mac.update(query_string.as_bytes());
        let result = mac.finalize();
        let signature = hex::encode(result.into_bytes());

        Ok(format!("{}&signature={}", query_string, signature))
    }

    async fn send_signed_request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: Vec<(&str, String)>,
    ) -> Result<T> {
        let full_query = self.sign_and_build_query(params)?;
        let url = format!("{}{}?{}", self.base_rest_url, endpoint, full_query);

        let response = self
            .http_client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .with_context(|| format!("request to {} failed", endpoint))?;

        Self::decode(endpoint, response).await
    }

    async fn send_public_request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_rest_url, endpoint);
        let response = self
            .http_client
            .get(&url)
            .query(params)
            .send()
            .await
            .with_context(|| format!("request to {} failed", endpoint))?;

        Self::decode(endpoint, response).await
    }

    /// Non-2xx bodies carry Binance's {"code","msg"} error; surface it instead
    /// of a bare status code.
    async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return match serde_json::from_str::<BinanceApiError>(&body) {
                Ok(err) => Err(anyhow!(
                    "Binance {} on {}: [{}] {}",
                    status,
                    endpoint,
                    err.code,
                    err.msg
                )),
                Err(_) => Err(anyhow!("Binance {} on {}: {}", status, endpoint, body)),
            };
        }

        serde_json::from_str(&body).with_context(|| format!("malformed {} response", endpoint))
    }
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    async fn get_balance(&self, asset: &str) -> Result<Decimal> {
        let resp: BinanceAccountInfo = self
            .send_signed_request(Method::GET, "/api/v3/account", vec![])
            .await?;

        let balance = resp
            .balances
            .iter()
            .find(|b| b.asset == asset)
            .ok_or_else(|| anyhow!("Asset {} not found in account", asset))?;

        Ok(balance.free)
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Ticker> {
        let resp: BinanceTickerPrice = self
            .send_public_request("/api/v3/ticker/price", &[("symbol", symbol.to_string())])
            .await?;

        Ok(Ticker {
            symbol: resp.symbol,
            price: resp.price,
            timestamp: Utc::now().timestamp_millis() as u64,
        })
    }

    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: u16) -> Result<Vec<Candle>> {
        let rows: Vec<BinanceKline> = self
            .send_public_request(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        debug!("Fetched {} {} klines for {}", rows.len(), interval, symbol);
        Ok(rows.into_iter().map(Candle::from).collect())
    }

    async fn symbol_filters(&self, symbol: &str) -> Result<SymbolFilters> {
        let info: BinanceExchangeInfo = self
            .send_public_request("/api/v3/exchangeInfo", &[("symbol", symbol.to_string())])
            .await?;

        let symbol_info = info
            .symbols
            .iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| anyhow!("Symbol {} not listed in exchangeInfo", symbol))?;

        Ok(symbol_info.to_filters())
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

        let params = vec![
            ("symbol", symbol.to_string()),
            ("side", side.as_str().to_string()),
            ("type", "MARKET".to_string()),
            ("quantity", quantity.normalize().to_string()),
            ("newClientOrderId", Uuid::new_v4().simple().to_string()),
            ("newOrderRespType", "RESULT".to_string()),
        ];

        info!("🚀 Sending Order: {} {} {} @ MARKET", side, quantity, symbol);

        let resp: BinanceOrderResponse = self
            .send_signed_request(Method::POST, "/api/v3/order", params)
            .await?;

        Ok(OrderResponse {
            id: resp.order_id.to_string(),
            symbol: resp.symbol,
            status: resp.status,
            executed_qty: resp.executed_qty,
        })
    }
}
