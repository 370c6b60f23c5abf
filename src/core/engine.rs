// src/core/engine.rs
use crate::config::{AppConfig, SymbolConfig};
use crate::connectors::traits::ExchangeClient;
use crate::core::decision::{decide, plan_buy, BuySkip, Decision, ExitReason};
use crate::core::position::{ExitRules, PositionBook, PositionError, PositionState};
use crate::error::TickError;
use crate::strategies::traits::Strategy;
use crate::types::{Side, SymbolFilters};
use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What one symbol did during one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Bought {
        quantity: Decimal,
        price: Decimal,
        position: PositionState,
    },
    Sold {
        quantity: Decimal,
        price: Decimal,
        reason: ExitReason,
    },
    BuySkipped(BuySkip),
    Held,
}

pub struct TradingEngine<S> {
    config: AppConfig,
    execution_handler: Box<dyn ExchangeClient>,
    strategy: S,
    positions: PositionBook,
    // Lot/notional rules rarely change; balance and price are never cached.
    filters: HashMap<String, SymbolFilters>,
}

impl<S> TradingEngine<S>
where
    S: Strategy,
{
    pub fn new(config: AppConfig, execution_handler: Box<dyn ExchangeClient>, strategy: S) -> Self {
        let positions = PositionBook::new(
            config.symbols.iter().map(|s| s.symbol.as_str()),
            ExitRules::from(&config.strategy),
        );
        Self {
            config,
            execution_handler,
            strategy,
            positions,
            filters: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn positions(&self) -> &PositionBook {
        &self.positions
    }

    /// Polls every symbol, sleeps, repeats. Only Ctrl+C ends the loop.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(tokio::signal::ctrl_c()).await
    }

    /// Same loop, stopped by `shutdown`. The future lives across ticks, so a
    /// signal that arrives mid-tick ends the loop at the next pause.
    pub async fn run_until<F, T>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = T>,
    {
        let pause = Duration::from_secs(self.config.poll_interval_secs);
        info!(
            "Engine loop running: {} on {} symbols, every {}s",
            self.strategy.name(),
            self.config.symbols.len(),
            self.config.poll_interval_secs
        );
        tokio::pin!(shutdown);

        loop {
            self.tick().await;

            info!("Waiting {}s...", self.config.poll_interval_secs);
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping engine");
                    for (symbol, position) in self.positions.open_positions() {
                        warn!(
                            "Leaving open position: {} {} (target {}, stop {})",
                            position.quantity(),
                            symbol,
                            position.target_sell_price().unwrap_or_default(),
                            position.stop_loss_price().unwrap_or_default()
                        );
                    }
                    return Ok(());
                }
            }
        }
    }

    /// One pass over all symbols. A failing symbol never affects the others.
    pub async fn tick(&mut self) {
        let symbols = self.config.symbols.clone();
        for symbol in &symbols {
            match self.process_symbol(symbol).await {
                Ok(outcome) => debug!("{} outcome: {:?}", symbol.symbol, outcome),
                Err(e @ TickError::InsufficientData { .. }) => warn!("{}", e),
                Err(e) => error!("⚠️ {} skipped this tick: {}", symbol.symbol, e),
            }
        }
    }

    pub async fn process_symbol(&mut self, symbol: &SymbolConfig) -> Result<TickOutcome, TickError> {
        let name = symbol.symbol.as_str();

        let ticker = self
            .execution_handler
            .fetch_price(name)
            .await
            .map_err(|e| TickError::data_fetch(name, "price", e))?;
        if ticker.price <= Decimal::ZERO {
            return Err(TickError::data_fetch(
                name,
                "price",
                anyhow!("exchange returned non-positive price {}", ticker.price),
            ));
        }
        info!("{} price: {} {}", name, ticker.price, self.config.quote_asset);

        let candles = self
            .execution_handler
            .fetch_candles(name, &self.config.kline_interval, self.config.kline_limit)
            .await
            .map_err(|e| TickError::data_fetch(name, "candles", e))?;

        let position = self.positions.get(name).copied().unwrap_or_default();
        // Exits only need the price; a short window just silences the votes.
        let total_signal = match self.strategy.evaluate(&candles) {
            Ok(signals) => {
                info!("{} signals {}", name, signals);
                signals.total()
            }
            Err(source) if position.is_flat() => {
                return Err(TickError::InsufficientData {
                    symbol: name.to_string(),
                    source,
                })
            }
            Err(source) => {
                warn!("{} no signal ({}), checking exits only", name, source);
                0
            }
        };

        match decide(total_signal, ticker.price, &position) {
            Decision::Buy => {
                info!("{} BUY signal (total {:+})", name, total_signal);
                self.handle_buy(symbol, ticker.price).await
            }
            Decision::Sell {
                quantity,
                reason,
                trigger,
            } => {
                info!(
                    "{} reached {} ({} {}), selling {}",
                    name, reason, trigger, self.config.quote_asset, quantity
                );
                self.handle_sell(name, quantity, ticker.price, reason).await
            }
            Decision::Hold => {
                info!("{} hold, no action", name);
                Ok(TickOutcome::Held)
            }
        }
    }

    async fn handle_buy(
        &mut self,
        symbol: &SymbolConfig,
        price: Decimal,
    ) -> Result<TickOutcome, TickError> {
        let name = symbol.symbol.as_str();
        let balance = self.quote_balance().await;
        let filters = self.symbol_filters(name).await?;

        let plan = match plan_buy(
            symbol.investment,
            price,
            balance,
            self.config.strategy.min_quote_reserve,
            &filters,
        ) {
            Ok(plan) => plan,
            Err(skip) => {
                warn!("{} buy skipped: {}", name, skip);
                return Ok(TickOutcome::BuySkipped(skip));
            }
        };

        info!(
            "Buying {} {} for {} {} (Notional: {}, balance {})",
            plan.quantity,
            name,
            symbol.investment,
            self.config.quote_asset,
            plan.notional,
            balance
        );

        let order = self
            .execution_handler
            .place_market_order(name, Side::Buy, plan.quantity)
            .await
            .map_err(|e| TickError::order(name, Side::Buy, e))?;
        info!("✅ Order Confirmed: {:?}", order);

        let filled = if order.executed_qty > Decimal::ZERO {
            order.executed_qty
        } else {
            plan.quantity
        };
        let position = self.positions.record_buy(name, filled, price)?;
        if let PositionState::Holding {
            target_sell_price,
            stop_loss_price,
            ..
        } = position
        {
            info!(
                "{} holding {}: target {} / stop {}",
                name, filled, target_sell_price, stop_loss_price
            );
        }

        Ok(TickOutcome::Bought {
            quantity: filled,
            price,
            position,
        })
    }

    async fn handle_sell(
        &mut self,
        name: &str,
        quantity: Decimal,
        price: Decimal,
        reason: ExitReason,
    ) -> Result<TickOutcome, TickError> {
        if quantity <= Decimal::ZERO {
            return Err(PositionError::NothingToSell(name.to_string()).into());
        }

        let order = self
            .execution_handler
            .place_market_order(name, Side::Sell, quantity)
            .await
            .map_err(|e| TickError::order(name, Side::Sell, e))?;
        info!("✅ Order Confirmed: {:?}", order);

        let sold = self.positions.record_sell(name)?;
        info!("{} sold {} at {} ({})", name, sold, price, reason);

        Ok(TickOutcome::Sold {
            quantity: sold,
            price,
            reason,
        })
    }

    /// A failed balance lookup reads as zero, which blocks the buy.
    async fn quote_balance(&self) -> Decimal {
        let asset = &self.config.quote_asset;
        match self.execution_handler.get_balance(asset).await {
            Ok(balance) => balance,
            Err(e) => {
                error!("Failed to fetch {} balance: {:#}", asset, e);
                Decimal::ZERO
            }
        }
    }

    async fn symbol_filters(&mut self, name: &str) -> Result<SymbolFilters, TickError> {
        if let Some(filters) = self.filters.get(name) {
            return Ok(*filters);
        }

        let filters = self
            .execution_handler
            .symbol_filters(name)
            .await
            .map_err(|e| TickError::data_fetch(name, "symbol filters", e))?;
        info!(
            "{} filters: step {} (precision {}), min qty {}, min notional {}",
            name,
            filters.step_size,
            filters.precision(),
            filters.min_quantity,
            filters.min_notional
        );
        self.filters.insert(name.to_string(), filters);
        Ok(filters)
    }
}
