//! Delivery service errors.

use sqlx::Error;
use storefront::delivery::PincodeError;
use thiserror::Error;

use crate::{domain::errors::ErrorKind, money::AmountError};

#[derive(Debug, Error)]
pub enum DeliveryServiceError {
    #[error(transparent)]
    InvalidPincode(#[from] PincodeError),

    #[error("delivery not available for this pincode")]
    Unavailable,

    #[error("invalid amount")]
    InvalidAmount(#[from] AmountError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl DeliveryServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPincode(_) => ErrorKind::InvalidArgument,
            Self::Unavailable => ErrorKind::DeliveryUnavailable,
            Self::InvalidAmount(_) | Self::Sql(_) => ErrorKind::Internal,
        }
    }
}

impl From<Error> for DeliveryServiceError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}
