//! Checkout totals

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};

use crate::{
    delivery::FeeSchedule,
    pricing::{PricingError, apply_rate},
};

/// Totals frozen onto an order at placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals<'a> {
    /// Sum of all line totals.
    pub items_subtotal: Money<'a, Currency>,

    /// Delivery fee after applying the free-shipping threshold.
    pub delivery_fee: Money<'a, Currency>,

    /// `items_subtotal + delivery_fee`.
    pub total: Money<'a, Currency>,
}

impl<'a> OrderTotals<'a> {
    /// Computes order totals from a subtotal and the location's fee schedule.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] when the currencies differ.
    pub fn compute(
        items_subtotal: Money<'a, Currency>,
        schedule: &FeeSchedule<'a>,
    ) -> Result<Self, PricingError> {
        let delivery_fee = schedule.quote(&items_subtotal);
        let total = items_subtotal.add(delivery_fee)?;

        Ok(Self {
            items_subtotal,
            delivery_fee,
            total,
        })
    }
}

/// Cart summary shown before checkout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals<'a> {
    /// Sum of line totals.
    pub subtotal: Money<'a, Currency>,

    /// Tax charged on the subtotal.
    pub tax_amount: Money<'a, Currency>,

    /// Delivery fee after the free-shipping threshold.
    pub shipping: Money<'a, Currency>,

    /// `subtotal + tax_amount + shipping`.
    pub total: Money<'a, Currency>,

    /// Whether shipping was waived.
    pub is_free_shipping: bool,
}

impl<'a> CartTotals<'a> {
    /// Computes a cart summary.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow or currency mismatch.
    pub fn compute(
        subtotal: Money<'a, Currency>,
        tax_rate: &Percentage,
        schedule: &FeeSchedule<'a>,
    ) -> Result<Self, PricingError> {
        let tax_amount = apply_rate(subtotal, tax_rate)?;
        let shipping = schedule.quote(&subtotal);
        let total = subtotal.add(tax_amount)?.add(shipping)?;

        Ok(Self {
            subtotal,
            tax_amount,
            shipping,
            total,
            is_free_shipping: shipping.to_minor_units() == 0,
        })
    }
}
