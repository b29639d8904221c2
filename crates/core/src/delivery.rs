//! Delivery

use std::{fmt, str::FromStr};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortest accepted pincode.
pub const PINCODE_MIN_LEN: usize = 6;

/// Longest accepted pincode.
pub const PINCODE_MAX_LEN: usize = 10;

/// Reasons a pincode is rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PincodeError {
    /// Nothing was supplied.
    #[error("pincode is required")]
    Missing,

    /// The pincode contains something other than digits or has the wrong length.
    #[error("pincode should be {PINCODE_MIN_LEN} to {PINCODE_MAX_LEN} digits")]
    InvalidFormat,
}

/// A normalized postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pincode(String);

impl Pincode {
    /// Normalizes and validates a raw pincode.
    ///
    /// # Errors
    ///
    /// Returns [`PincodeError`] when the value is empty or not a 6 to 10 digit string.
    pub fn parse(raw: &str) -> Result<Self, PincodeError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(PincodeError::Missing);
        }

        let valid_len = (PINCODE_MIN_LEN..=PINCODE_MAX_LEN).contains(&trimmed.len());

        if !valid_len || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(PincodeError::InvalidFormat);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the pincode digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pincode {
    type Err = PincodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Pincode {
    type Error = PincodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pincode> for String {
    fn from(value: Pincode) -> Self {
        value.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery fee and the subtotal above which it is waived.
///
/// The minimum order is a free-shipping threshold only; it never blocks an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule<'a> {
    /// Fee charged below the threshold.
    pub delivery_fee: Money<'a, Currency>,

    /// Subtotal at or above which delivery is free.
    pub minimum_order: Money<'a, Currency>,
}

impl<'a> FeeSchedule<'a> {
    /// Whether a subtotal qualifies for free delivery.
    pub fn is_free_for(&self, subtotal: &Money<'a, Currency>) -> bool {
        subtotal.to_minor_units() >= self.minimum_order.to_minor_units()
    }

    /// Quotes the delivery fee for a subtotal.
    pub fn quote(&self, subtotal: &Money<'a, Currency>) -> Money<'a, Currency> {
        if self.is_free_for(subtotal) {
            Money::from_minor(0, self.delivery_fee.currency())
        } else {
            self.delivery_fee
        }
    }

    /// Human-readable free delivery message.
    pub fn free_delivery_text(&self) -> String {
        if self.delivery_fee.to_minor_units() > 0 {
            format!("Free delivery on orders above {}", self.minimum_order)
        } else {
            "Free delivery".to_string()
        }
    }
}
