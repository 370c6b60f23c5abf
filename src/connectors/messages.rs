// src/connectors/messages.rs
use crate::types::{Candle, SymbolFilters};
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::Deserialize;

/// Ответ /api/v3/ticker/price
#[derive(Debug, Deserialize)]
pub struct BinanceTickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// Строка /api/v3/klines. Binance отдаёт массив, а не объект:
/// [open_time, open, high, low, close, volume, close_time, quote_volume,
///  trades, taker_base_volume, taker_quote_volume, ignore]
#[derive(Debug, Deserialize)]
pub struct BinanceKline(
    pub u64,
    pub Decimal,
    pub Decimal,
    pub Decimal,
    pub Decimal,
    pub Decimal,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
);

impl From<BinanceKline> for Candle {
    fn from(k: BinanceKline) -> Self {
        Candle {
            open_time: k.0,
            open: k.1,
            high: k.2,
            low: k.3,
            close: k.4,
            volume: k.5,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BinanceExchangeInfo {
    pub symbols: Vec<BinanceSymbolInfo>,
}

#[derive(Debug, Deserialize)]
pub struct BinanceSymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub filters: Vec<BinanceSymbolFilter>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "filterType")]
pub enum BinanceSymbolFilter {
    #[serde(rename = "LOT_SIZE")]
    LotSize {
        #[serde(rename = "minQty")]
        min_qty: Decimal,
        #[serde(rename = "stepSize")]
        step_size: Decimal,
    },

    #[serde(rename = "NOTIONAL")]
    Notional {
        #[serde(rename = "minNotional")]
        min_notional: Decimal,
    },

    // Старое имя фильтра, встречается на части пар
    #[serde(rename = "MIN_NOTIONAL")]
    MinNotional {
        #[serde(rename = "minNotional")]
        min_notional: Decimal,
    },

    #[serde(other)]
    Other,
}

impl BinanceSymbolInfo {
    /// Missing filters fall back to `SymbolFilters::default()`. `NOTIONAL`
    /// wins over the legacy `MIN_NOTIONAL`.
    pub fn to_filters(&self) -> SymbolFilters {
        let mut filters = SymbolFilters::default();
        let mut legacy_notional = None;
        let mut notional = None;

        for filter in &self.filters {
            match filter {
                BinanceSymbolFilter::LotSize { min_qty, step_size } => {
                    filters.min_quantity = *min_qty;
                    filters.step_size = *step_size;
                }
                BinanceSymbolFilter::Notional { min_notional } => notional = Some(*min_notional),
                BinanceSymbolFilter::MinNotional { min_notional } => {
                    legacy_notional = Some(*min_notional)
                }
                BinanceSymbolFilter::Other => {}
            }
        }

        if let Some(min_notional) = notional.or(legacy_notional) {
            filters.min_notional = min_notional;
        }
        filters
    }
}

#[derive(Debug, Deserialize)]
pub struct BinanceBalance {
    pub asset: String,
    pub free: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct BinanceAccountInfo {
    pub balances: Vec<BinanceBalance>,
}

#[derive(Debug, Deserialize)]
pub struct BinanceOrderResponse {
    #[serde(rename = "orderId")]
    pub order_id: u64,
    pub symbol: String,
    pub status: String,
    #[serde(rename = "executedQty", default)]
    pub executed_qty: Decimal,
}

/// Тело ошибки Binance: {"code": -1013, "msg": "Filter failure: NOTIONAL"}
#[derive(Debug, Deserialize)]
pub struct BinanceApiError {
    pub code: i64,
    pub msg: String,
}
