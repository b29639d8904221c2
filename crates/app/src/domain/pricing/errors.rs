//! Pricing service errors.

use sqlx::Error;
use thiserror::Error;

use crate::{domain::errors::ErrorKind, money::AmountError};

#[derive(Debug, Error)]
pub enum PricingServiceError {
    #[error("variant not found")]
    NotFound,

    #[error("invalid price data")]
    InvalidPrice(#[from] AmountError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl PricingServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::InvalidPrice(_) | Self::Sql(_) => ErrorKind::Internal,
        }
    }
}

impl From<Error> for PricingServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
