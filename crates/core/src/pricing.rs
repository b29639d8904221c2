//! Pricing

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Discounts and rates are stored as basis points: `1_000` is 10%.
pub const BASIS_POINTS_PER_WHOLE: u32 = 10_000;

/// Errors raised while resolving prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Discount or rate outside the inclusive range 0%..=100%.
    #[error("percentage must be between 0% and 100%")]
    DiscountOutOfRange,

    /// A calculation could not be represented in minor units.
    #[error("price calculation overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The price inputs of a single variant.
#[derive(Debug, Clone, Copy)]
pub struct VariantPrice<'a> {
    /// Product base price.
    pub base_price: Money<'a, Currency>,

    /// Variant surcharge added on top of the base price.
    pub surcharge: Money<'a, Currency>,

    /// Active deal discount, as a fraction (`0.10` is 10%).
    pub discount: Option<Percentage>,
}

/// Builds a percentage from basis points.
///
/// # Errors
///
/// Returns [`PricingError::DiscountOutOfRange`] above 10 000 basis points.
pub fn percentage_from_basis_points(basis_points: u32) -> Result<Percentage, PricingError> {
    if basis_points > BASIS_POINTS_PER_WHOLE {
        return Err(PricingError::DiscountOutOfRange);
    }

    Ok(Percentage::from(Decimal::new(i64::from(basis_points), 4)))
}

/// Resolves the effective unit price of a variant.
///
/// `base + surcharge`, reduced by the deal discount when one is active and
/// rounded half-to-even to the currency's minor unit.
///
/// # Errors
///
/// - [`PricingError::DiscountOutOfRange`]: the discount is below 0% or above 100%.
/// - [`PricingError::Overflow`]: the result does not fit in minor units.
/// - [`PricingError::Money`]: base price and surcharge use different currencies.
pub fn unit_price<'a>(price: &VariantPrice<'a>) -> Result<Money<'a, Currency>, PricingError> {
    let base = price.base_price.add(price.surcharge)?;

    let Some(discount) = price.discount else {
        return Ok(base);
    };

    let fraction = discount * Decimal::ONE;

    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        return Err(PricingError::DiscountOutOfRange);
    }

    let discounted = apply_fraction(base.to_minor_units(), Decimal::ONE - fraction)?;

    Ok(Money::from_minor(discounted, base.currency()))
}

/// Multiplies a unit price by a quantity.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] when the total does not fit in minor units.
pub fn line_total<'a>(
    unit_price: Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, PricingError> {
    let total = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(total, unit_price.currency()))
}

/// Sums line totals, starting from zero in the given currency.
///
/// # Errors
///
/// Returns [`PricingError::Money`] when a line uses a different currency.
pub fn sum_totals<'a, I>(
    currency: &'a Currency,
    totals: I,
) -> Result<Money<'a, Currency>, PricingError>
where
    I: IntoIterator<Item = Money<'a, Currency>>,
{
    totals
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, total| acc.add(total))
        .map_err(PricingError::from)
}

/// Applies a rate (tax, for instance) to an amount, rounding half-to-even.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] when the result does not fit in minor units.
pub fn apply_rate<'a>(
    amount: Money<'a, Currency>,
    rate: &Percentage,
) -> Result<Money<'a, Currency>, PricingError> {
    let applied = apply_fraction(amount.to_minor_units(), (*rate) * Decimal::ONE)?;

    Ok(Money::from_minor(applied, amount.currency()))
}

fn apply_fraction(minor: i64, fraction: Decimal) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::Overflow)?;

    fraction
        .checked_mul(minor)
        .ok_or(PricingError::Overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
        .ok_or(PricingError::Overflow)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;

    fn price(base: i64, surcharge: i64, discount: Option<Percentage>) -> VariantPrice<'static> {
        VariantPrice {
            base_price: Money::from_minor(base, INR),
            surcharge: Money::from_minor(surcharge, INR),
            discount,
        }
    }

    #[test]
    fn unit_price_without_deal_is_base_plus_surcharge() -> TestResult {
        let unit = unit_price(&price(100_00, 20_00, None))?;

        assert_eq!(unit, Money::from_minor(120_00, INR));

        Ok(())
    }

    #[test]
    fn unit_price_applies_deal_discount() -> TestResult {
        let discount = percentage_from_basis_points(1_000)?;
        let unit = unit_price(&price(100_00, 20_00, Some(discount)))?;

        assert_eq!(unit, Money::from_minor(108_00, INR));

        Ok(())
    }

    #[test]
    fn unit_price_rounds_half_to_even() -> TestResult {
        // 0.25 * 10 = 2.5 paise off, rounded to even.
        let quarter_off = percentage_from_basis_points(2_500)?;

        assert_eq!(
            unit_price(&price(10, 0, Some(quarter_off)))?,
            Money::from_minor(8, INR)
        );

        // 0.25 * 14 = 3.5 paise off; 10.5 rounds down to 10.
        assert_eq!(
            unit_price(&price(14, 0, Some(quarter_off)))?,
            Money::from_minor(10, INR)
        );

        Ok(())
    }

    #[test]
    fn unit_price_full_discount_is_free() -> TestResult {
        let unit = unit_price(&price(5_00, 1_00, Some(percentage_from_basis_points(10_000)?)))?;

        assert_eq!(unit, Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn unit_price_is_deterministic() -> TestResult {
        let input = price(99_99, 1, Some(percentage_from_basis_points(333)?));

        assert_eq!(unit_price(&input)?, unit_price(&input)?);

        Ok(())
    }

    #[test]
    fn unit_price_rejects_discount_above_one_hundred_percent() {
        let result = unit_price(&price(100, 0, Some(Percentage::from(1.5))));

        assert_eq!(result, Err(PricingError::DiscountOutOfRange));
    }

    #[test]
    fn percentage_from_basis_points_rejects_out_of_range() {
        assert!(matches!(
            percentage_from_basis_points(10_001),
            Err(PricingError::DiscountOutOfRange)
        ));
    }

    #[test]
    fn line_total_multiplies_quantity() -> TestResult {
        let total = line_total(Money::from_minor(108_00, INR), 3)?;

        assert_eq!(total, Money::from_minor(324_00, INR));

        Ok(())
    }

    #[test]
    fn line_total_overflow_returns_error() {
        let result = line_total(Money::from_minor(i64::MAX, INR), 2);

        assert_eq!(result, Err(PricingError::Overflow));
    }

    #[test]
    fn sum_totals_of_nothing_is_zero() -> TestResult {
        assert_eq!(sum_totals(INR, [])?, Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn sum_totals_adds_lines() -> TestResult {
        let total = sum_totals(
            INR,
            [Money::from_minor(1_50, INR), Money::from_minor(2_25, INR)],
        )?;

        assert_eq!(total, Money::from_minor(3_75, INR));

        Ok(())
    }

    #[test]
    fn apply_rate_rounds_half_to_even() -> TestResult {
        let rate = Percentage::from(Decimal::new(5, 2));

        // 5% of 50 paise is 2.5, which rounds to 2.
        assert_eq!(
            apply_rate(Money::from_minor(50, INR), &rate)?,
            Money::from_minor(2, INR)
        );

        Ok(())
    }
}
