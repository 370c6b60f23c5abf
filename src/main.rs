// src/main.rs
use crate::config::AppConfig;
use crate::connectors::binance::BinanceClient;
use crate::connectors::paper::PaperExchange;
use crate::connectors::traits::ExchangeClient;
use crate::core::engine::TradingEngine;
use crate::strategies::voting::IndicatorVoting;
use dotenvy::dotenv;
use tracing::info;

mod config;
mod connectors;
mod core;
mod error;
mod indicators;
mod logging;
mod strategies;
mod types;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Load Configuration
    let config = AppConfig::new()?;
    let _log_guard = logging::init(&config.logging)?;

    println!("========================================");
    println!("       THE SIGNAL BOT - v0.1.0");
    println!("========================================");
    for symbol in &config.symbols {
        println!(
            "Target: {} ({} {} per trade)",
            symbol.symbol, symbol.investment, config.quote_asset
        );
    }
    println!(
        "Mode:   {}",
        if config.live_trading {
            "🚨 LIVE TRADING"
        } else {
            "📝 PAPER TRADING"
        }
    );
    println!("========================================");

    // 2. Initialize Components
    let client = BinanceClient::new(config.api_key.clone(), config.secret_key.clone())
        .with_base_url(config.base_url.clone());
    let execution_handler: Box<dyn ExchangeClient> = if config.live_trading {
        Box::new(client)
    } else {
        info!(
            "Paper ledger starts with {} {}",
            config.paper_quote_balance, config.quote_asset
        );
        Box::new(PaperExchange::new(
            client,
            config.quote_asset.clone(),
            config.paper_quote_balance,
        ))
    };
    let strategy = IndicatorVoting::new(&config.strategy);

    // 3. Run Engine
    let mut engine = TradingEngine::new(config, execution_handler, strategy);
    engine.run().await
}
