//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind as SqlErrorKind},
};
use storefront::delivery::PincodeError;
use thiserror::Error;

use crate::{domain::errors::ErrorKind, money::AmountError};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("variant not found")]
    VariantNotFound,

    #[error("cart line not found")]
    LineNotFound,

    #[error("only {available} available")]
    InsufficientStock { available: u32 },

    #[error(transparent)]
    InvalidPincode(#[from] PincodeError),

    #[error("delivery is not available for this pincode")]
    DeliveryUnavailable,

    #[error("invalid price data")]
    InvalidAmount(#[from] AmountError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl CartsServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity | Self::InvalidPincode(_) => ErrorKind::InvalidArgument,
            Self::VariantNotFound | Self::LineNotFound => ErrorKind::NotFound,
            Self::InsufficientStock { available } => ErrorKind::InsufficientStock {
                available: *available,
            },
            Self::DeliveryUnavailable => ErrorKind::DeliveryUnavailable,
            Self::InvalidAmount(_) | Self::Sql(_) => ErrorKind::Internal,
        }
    }
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::LineNotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(SqlErrorKind::ForeignKeyViolation) => Self::VariantNotFound,
            Some(SqlErrorKind::CheckViolation) => Self::InvalidQuantity,
            Some(_) | None => Self::Sql(error),
        }
    }
}
