// src/core/decision.rs
use crate::core::position::PositionState;
use crate::types::SymbolFilters;
use crate::utils::precision::{normalize_quantity, truncate_to_precision};
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Smallest total signal that opens a position.
pub const BUY_SIGNAL_THRESHOLD: i8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Target,
    StopLoss,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Target => write!(f, "profit target"),
            ExitReason::StopLoss => write!(f, "stop-loss"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Buy,
    Sell {
        quantity: Decimal,
        reason: ExitReason,
        trigger: Decimal,
    },
    Hold,
}

/// One step of the per-symbol state machine. A flat position only reacts to
/// the signal; a held one only to its exit prices, target first.
pub fn decide(total_signal: i8, price: Decimal, position: &PositionState) -> Decision {
    match *position {
        PositionState::Flat if total_signal >= BUY_SIGNAL_THRESHOLD => Decision::Buy,
        PositionState::Flat => Decision::Hold,
        PositionState::Holding {
            quantity,
            target_sell_price,
            stop_loss_price,
        } => {
            if price >= target_sell_price {
                Decision::Sell {
                    quantity,
                    reason: ExitReason::Target,
                    trigger: target_sell_price,
                }
            } else if price <= stop_loss_price {
                Decision::Sell {
                    quantity,
                    reason: ExitReason::StopLoss,
                    trigger: stop_loss_price,
                }
            } else {
                Decision::Hold
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyPlan {
    pub quantity: Decimal,
    pub notional: Decimal,
}

/// Reasons a buy signal does not turn into an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuySkip {
    #[error("price {0} is not positive")]
    InvalidPrice(Decimal),

    #[error("quote balance {balance} is at or below the {reserve} reserve")]
    InsufficientBalance { balance: Decimal, reserve: Decimal },

    #[error("quantity {quantity} is below the minimum {min_quantity}")]
    BelowMinQuantity {
        quantity: Decimal,
        min_quantity: Decimal,
    },

    #[error("notional {notional} is below the minimum {min_notional}")]
    BelowMinNotional {
        notional: Decimal,
        min_notional: Decimal,
    },
}

/// Sizes a fixed-amount market buy and checks it against the balance reserve
/// and the symbol's lot and notional filters.
pub fn plan_buy(
    investment: Decimal,
    price: Decimal,
    balance: Decimal,
    reserve: Decimal,
    filters: &SymbolFilters,
) -> Result<BuyPlan, BuySkip> {
    if price <= Decimal::ZERO {
        return Err(BuySkip::InvalidPrice(price));
    }
    if balance <= reserve {
        return Err(BuySkip::InsufficientBalance { balance, reserve });
    }

    let raw = investment / price;
    let quantity = normalize_quantity(
        truncate_to_precision(raw, filters.precision()),
        filters.step_size,
    );
    if quantity.is_zero() || quantity < filters.min_quantity {
        return Err(BuySkip::BelowMinQuantity {
            quantity,
            min_quantity: filters.min_quantity,
        });
    }

    let notional = quantity * price;
    if notional < filters.min_notional {
        return Err(BuySkip::BelowMinNotional {
            notional,
            min_notional: filters.min_notional,
        });
    }

    Ok(BuyPlan { quantity, notional })
}
