//! Rounding convention for monetary amounts.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to the smallest currency unit, half away from zero.
///
/// Both the forward and the inverse path round gross amounts with this
/// function and nothing else, so a round trip is stable.
///
/// # Examples
///
/// ```
/// use salary_engine::calculation::round_to_unit;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_to_unit(Decimal::from_str("1234.5").unwrap(), 0), Decimal::from(1235));
/// assert_eq!(round_to_unit(Decimal::from_str("12.345").unwrap(), 2), Decimal::from_str("12.35").unwrap());
/// ```
pub fn round_to_unit(value: Decimal, currency_decimals: u32) -> Decimal {
    value.round_dp_with_strategy(currency_decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the smallest currency unit (1 for VND, 0.01 for cents).
pub fn currency_unit(currency_decimals: u32) -> Decimal {
    Decimal::new(1, currency_decimals)
}
