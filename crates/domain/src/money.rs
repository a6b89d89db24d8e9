//! Monetary helpers
//!
//! Amounts are [`Decimal`] values kept at two decimal places; rounding is
//! half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{DEFAULT_TAX_RATE_PERCENT, MONEY_SCALE};

/// Round `amount` to the money scale
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `unit_price × quantity`, rounded
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    round_money(unit_price * Decimal::from(quantity))
}

/// Tax owed on `subtotal` at `rate`, rounded
pub fn tax_on(subtotal: Decimal, rate: Decimal) -> Decimal {
    round_money(subtotal * rate)
}

/// The default tax rate (10%)
pub fn default_tax_rate() -> Decimal {
    Decimal::new(DEFAULT_TAX_RATE_PERCENT, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_multiplies_and_rounds() {
        assert_eq!(line_total(Decimal::new(1000, 2), 2), Decimal::new(2000, 2));
        assert_eq!(line_total(Decimal::new(333, 3), 3), Decimal::new(100, 2));
    }

    #[test]
    fn tax_rounds_half_away_from_zero() {
        assert_eq!(tax_on(Decimal::new(2500, 2), default_tax_rate()), Decimal::new(250, 2));
        assert_eq!(tax_on(Decimal::new(105, 2), default_tax_rate()), Decimal::new(11, 2));
    }
}
