//! Orders service errors.

use sqlx::Error;
use storefront::delivery::PincodeError;
use thiserror::Error;

use crate::{
    domain::{errors::ErrorKind, pricing::records::VariantUuid, tracking::TrackingServiceError},
    money::AmountError,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("address not found")]
    AddressNotFound,

    #[error("variant {0} not found")]
    VariantNotFound(VariantUuid),

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("nothing to order")]
    EmptyCart,

    #[error(transparent)]
    InvalidPincode(#[from] PincodeError),

    #[error("delivery is not available for this pincode")]
    DeliveryUnavailable,

    #[error("only {available} of variant {variant} available")]
    InsufficientStock { variant: VariantUuid, available: u32 },

    #[error(transparent)]
    Tracking(#[from] TrackingServiceError),

    #[error("invalid amount")]
    InvalidAmount(#[from] AmountError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl OrdersServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound | Self::AddressNotFound | Self::VariantNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::InvalidQuantity | Self::InvalidPincode(_) => ErrorKind::InvalidArgument,
            Self::EmptyCart => ErrorKind::EmptyCart,
            Self::DeliveryUnavailable => ErrorKind::DeliveryUnavailable,
            Self::InsufficientStock { available, .. } => ErrorKind::InsufficientStock {
                available: *available,
            },
            Self::Tracking(error) => error.kind(),
            Self::InvalidAmount(_) | Self::Sql(_) => ErrorKind::Internal,
        }
    }
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
