//! Payments service errors.

use sqlx::Error;
use storefront::status::{OrderStatus, PaymentStatus};
use thiserror::Error;

use crate::domain::errors::ErrorKind;

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("payment not found")]
    NotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("payment amount must be greater than zero")]
    InvalidAmount,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("order in status {status} with payment {payment_status} cannot take payments")]
    OrderNotPayable {
        status: OrderStatus,
        payment_status: PaymentStatus,
    },

    #[error("cannot move payment from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("storage error")]
    Sql(#[source] Error),
}

impl PaymentsServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound | Self::OrderNotFound => ErrorKind::NotFound,
            Self::InvalidAmount | Self::MissingField(_) => ErrorKind::InvalidArgument,
            Self::OrderNotPayable { .. } | Self::InvalidTransition { .. } => {
                ErrorKind::InvalidState
            }
            Self::Sql(_) => ErrorKind::Internal,
        }
    }
}

impl From<Error> for PaymentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
