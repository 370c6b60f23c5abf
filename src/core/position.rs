// src/core/position.rs
use crate::config::StrategyConfig;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

/// Position of one symbol. Exit prices exist exactly while something is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Holding {
        quantity: Decimal,
        target_sell_price: Decimal,
        stop_loss_price: Decimal,
    },
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn quantity(&self) -> Decimal {
        match self {
            PositionState::Flat => Decimal::ZERO,
            PositionState::Holding { quantity, .. } => *quantity,
        }
    }

    pub fn target_sell_price(&self) -> Option<Decimal> {
        match self {
            PositionState::Flat => None,
            PositionState::Holding {
                target_sell_price, ..
            } => Some(*target_sell_price),
        }
    }

    pub fn stop_loss_price(&self) -> Option<Decimal> {
        match self {
            PositionState::Flat => None,
            PositionState::Holding {
                stop_loss_price, ..
            } => Some(*stop_loss_price),
        }
    }
}

/// Profit-target and stop-loss multipliers applied to the fill price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitRules {
    pub profit_target_multiplier: Decimal,
    pub stop_loss_multiplier: Decimal,
}

impl From<&StrategyConfig> for ExitRules {
    fn from(config: &StrategyConfig) -> Self {
        Self {
            profit_target_multiplier: config.profit_target_multiplier,
            stop_loss_multiplier: config.stop_loss_multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionError {
    #[error("{0} is not a configured symbol")]
    UnknownSymbol(String),

    #[error("nothing held in {0}")]
    NothingToSell(String),

    #[error("fill quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),
}

/// Per-symbol positions, one entry per configured symbol for the whole run.
#[derive(Debug, Clone)]
pub struct PositionBook {
    positions: HashMap<String, PositionState>,
    exits: ExitRules,
}

impl PositionBook {
    pub fn new<'a>(symbols: impl IntoIterator<Item = &'a str>, exits: ExitRules) -> Self {
        Self {
            positions: symbols
                .into_iter()
                .map(|s| (s.to_string(), PositionState::Flat))
                .collect(),
            exits,
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&PositionState> {
        self.positions.get(symbol)
    }

    pub fn open_positions(&self) -> impl Iterator<Item = (&String, &PositionState)> {
        self.positions.iter().filter(|(_, p)| !p.is_flat())
    }

    /// Adds a fill and re-arms both exits from `fill_price`.
    pub fn record_buy(
        &mut self,
        symbol: &str,
        filled_quantity: Decimal,
        fill_price: Decimal,
    ) -> Result<PositionState, PositionError> {
        if filled_quantity <= Decimal::ZERO {
            return Err(PositionError::NonPositiveQuantity(filled_quantity));
        }
        let exits = self.exits;
        let position = self
            .positions
            .get_mut(symbol)
            .ok_or_else(|| PositionError::UnknownSymbol(symbol.to_string()))?;

        *position = PositionState::Holding {
            quantity: position.quantity() + filled_quantity,
            target_sell_price: fill_price * exits.profit_target_multiplier,
            stop_loss_price: fill_price * exits.stop_loss_multiplier,
        };
        Ok(*position)
    }

    /// Clears the position, returning the quantity that was held.
    pub fn record_sell(&mut self, symbol: &str) -> Result<Decimal, PositionError> {
        let position = self
            .positions
            .get_mut(symbol)
            .ok_or_else(|| PositionError::UnknownSymbol(symbol.to_string()))?;

        match *position {
            PositionState::Flat => Err(PositionError::NothingToSell(symbol.to_string())),
            PositionState::Holding { quantity, .. } => {
                *position = PositionState::Flat;
                Ok(quantity)
            }
        }
    }
}
