//! Pricing Models

use storefront::pricing::{self, PricingError, VariantPrice};

use crate::{
    domain::pricing::records::{ProductUuid, VariantUuid},
    money::{AmountError, to_minor, to_money},
};

/// Everything needed to price a variant at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPricing {
    pub variant_uuid: VariantUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub sku: String,
    pub base_price: u64,
    pub surcharge: u64,
    pub is_active: bool,

    /// Discount of the deal active at the lookup time, if any.
    pub discount_basis_points: Option<i32>,
}

impl VariantPricing {
    /// Effective unit price in minor units.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`] when the deal discount is outside 0..=100% or
    /// the price does not fit in minor units.
    pub fn unit_price(&self) -> Result<u64, AmountError> {
        let discount = self
            .discount_basis_points
            .map(|basis_points| {
                u32::try_from(basis_points)
                    .map_err(|_| PricingError::DiscountOutOfRange)
                    .and_then(pricing::percentage_from_basis_points)
            })
            .transpose()?;

        let price = pricing::unit_price(&VariantPrice {
            base_price: to_money(self.base_price)?,
            surcharge: to_money(self.surcharge)?,
            discount,
        })?;

        to_minor(&price)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn pricing(discount_basis_points: Option<i32>) -> VariantPricing {
        VariantPricing {
            variant_uuid: VariantUuid::new(),
            product_uuid: ProductUuid::new(),
            product_name: "Mango Pickle".to_string(),
            sku: "PKL-MNG-500".to_string(),
            base_price: 100_00,
            surcharge: 20_00,
            is_active: true,
            discount_basis_points,
        }
    }

    #[test]
    fn unit_price_applies_discount() -> TestResult {
        assert_eq!(pricing(Some(1_000)).unit_price()?, 108_00);
        assert_eq!(pricing(None).unit_price()?, 120_00);

        Ok(())
    }

    #[test]
    fn unit_price_rejects_negative_discount() {
        assert_eq!(
            pricing(Some(-1)).unit_price(),
            Err(AmountError::Pricing(PricingError::DiscountOutOfRange))
        );
    }

    #[test]
    fn unit_price_rejects_discount_above_whole() {
        assert_eq!(
            pricing(Some(10_001)).unit_price(),
            Err(AmountError::Pricing(PricingError::DiscountOutOfRange))
        );
    }
}
