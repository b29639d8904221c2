//! Minor-unit amounts
//!
//! Storage and service models carry money as `u64` paise. Arithmetic goes
//! through [`storefront::pricing`] so rounding and overflow rules live in one place.

use rusty_money::{
    Money,
    iso::{self, Currency},
};
use storefront::pricing::{self, PricingError};
use thiserror::Error;

/// Currency every amount in the store is denominated in.
pub const STORE_CURRENCY: &Currency = iso::INR;

#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("amount out of range")]
    OutOfRange,

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Wrap minor units as store-currency money.
///
/// # Errors
///
/// Returns [`AmountError::OutOfRange`] above `i64::MAX` paise.
pub fn to_money(minor: u64) -> Result<Money<'static, Currency>, AmountError> {
    let minor = i64::try_from(minor).map_err(|_| AmountError::OutOfRange)?;

    Ok(Money::from_minor(minor, STORE_CURRENCY))
}

/// Unwrap money into non-negative minor units.
///
/// # Errors
///
/// Returns [`AmountError::OutOfRange`] for negative amounts.
pub fn to_minor(money: &Money<'_, Currency>) -> Result<u64, AmountError> {
    u64::try_from(money.to_minor_units()).map_err(|_| AmountError::OutOfRange)
}

/// `unit_price * quantity` in minor units.
///
/// # Errors
///
/// Returns an [`AmountError`] on overflow.
pub fn line_total(unit_price: u64, quantity: u32) -> Result<u64, AmountError> {
    let total = pricing::line_total(to_money(unit_price)?, quantity)?;

    to_minor(&total)
}

/// Sum of minor-unit amounts.
///
/// # Errors
///
/// Returns an [`AmountError`] on overflow.
pub fn sum<I>(amounts: I) -> Result<u64, AmountError>
where
    I: IntoIterator<Item = u64>,
{
    let amounts = amounts
        .into_iter()
        .map(to_money)
        .collect::<Result<Vec<_>, _>>()?;

    to_minor(&pricing::sum_totals(STORE_CURRENCY, amounts)?)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn line_total_multiplies() -> TestResult {
        assert_eq!(line_total(108_00, 3)?, 324_00);

        Ok(())
    }

    #[test]
    fn sum_adds_amounts() -> TestResult {
        assert_eq!(sum([1_50, 2_25])?, 3_75);
        assert_eq!(sum([])?, 0);

        Ok(())
    }

    #[test]
    fn to_money_rejects_values_beyond_i64() {
        assert_eq!(to_money(u64::MAX).err(), Some(AmountError::OutOfRange));
    }
}
