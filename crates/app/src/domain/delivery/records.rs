//! Delivery Records

use storefront::delivery::FeeSchedule;

use crate::{
    money::{AmountError, to_minor, to_money},
    uuids::TypedUuid,
};

/// Delivery Location UUID
pub type DeliveryLocationUuid = TypedUuid<DeliveryLocation>;

/// A serviceable pincode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryLocation {
    pub uuid: DeliveryLocationUuid,
    pub pincode: String,
    pub area_name: String,
    pub city: String,
    pub state: String,
    pub delivery_fee: u64,

    /// Subtotal at or above which delivery is free.
    pub minimum_order: u64,
    pub estimated_delivery_hours: u32,
    pub is_available: bool,
}

impl DeliveryLocation {
    /// Fee and free-shipping threshold as money.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::OutOfRange`] for amounts beyond `i64::MAX`.
    pub fn fee_schedule(&self) -> Result<FeeSchedule<'static>, AmountError> {
        Ok(FeeSchedule {
            delivery_fee: to_money(self.delivery_fee)?,
            minimum_order: to_money(self.minimum_order)?,
        })
    }

    /// Delivery fee for a subtotal: zero at or above the minimum order.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`] for amounts beyond `i64::MAX`.
    pub fn quote_fee(&self, subtotal: u64) -> Result<u64, AmountError> {
        let fee = self.fee_schedule()?.quote(&to_money(subtotal)?);

        to_minor(&fee)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn location() -> DeliveryLocation {
        DeliveryLocation {
            uuid: DeliveryLocationUuid::new(),
            pincode: "175001".to_string(),
            area_name: "Mandi Town".to_string(),
            city: "Mandi".to_string(),
            state: "Himachal Pradesh".to_string(),
            delivery_fee: 50_00,
            minimum_order: 200_00,
            estimated_delivery_hours: 24,
            is_available: true,
        }
    }

    #[test]
    fn quote_fee_waives_fee_at_threshold() -> TestResult {
        assert_eq!(location().quote_fee(250_00)?, 0);
        assert_eq!(location().quote_fee(200_00)?, 0);

        Ok(())
    }

    #[test]
    fn quote_fee_charges_below_threshold() -> TestResult {
        assert_eq!(location().quote_fee(100_00)?, 50_00);
        assert_eq!(location().quote_fee(0)?, 50_00);

        Ok(())
    }
}
