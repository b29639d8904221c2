//! Delivery tracking errors.

use sqlx::Error;
use storefront::status::OrderStatus;
use thiserror::Error;

use crate::domain::errors::ErrorKind;

#[derive(Debug, Error)]
pub enum TrackingServiceError {
    #[error("order not found")]
    NotFound,

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl TrackingServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::InvalidTransition { .. } => ErrorKind::InvalidState,
            Self::MissingField(_) => ErrorKind::InvalidArgument,
            Self::Sql(_) => ErrorKind::Internal,
        }
    }
}

impl From<Error> for TrackingServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
