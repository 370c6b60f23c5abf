// src/utils/precision.rs
use rust_decimal::{Decimal, RoundingStrategy};

/// Округляет количество ВНИЗ до ближайшего кратного step_size.
/// Пример: amount=10.999, step=1.0 -> 10.0
pub fn normalize_quantity(amount: Decimal, step_size: Decimal) -> Decimal {
    if step_size.is_zero() {
        return amount;
    }
    ((amount / step_size).floor() * step_size).normalize()
}

/// Truncates `amount` to `precision` decimal digits, never rounding up.
pub fn truncate_to_precision(amount: Decimal, precision: u32) -> Decimal {
    amount
        .round_dp_with_strategy(precision, RoundingStrategy::ToZero)
        .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn quantity_rounds_down_to_step() {
        assert_eq!(normalize_quantity(dec("10.999"), dec("1")), dec("10"));
        assert_eq!(normalize_quantity(dec("0.12345"), dec("0.001")), dec("0.123"));
        assert_eq!(normalize_quantity(dec("7.3"), dec("0.5")), dec("7"));
        assert_eq!(normalize_quantity(dec("7.3"), Decimal::ZERO), dec("7.3"));
    }

    #[test]
    fn truncation_never_rounds_up() {
        assert_eq!(truncate_to_precision(dec("1.999"), 2), dec("1.99"));
        assert_eq!(truncate_to_precision(dec("150000.9"), 0), dec("150000"));
    }
}
