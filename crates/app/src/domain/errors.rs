//! Error kinds shared by every service.

use std::{error::Error, fmt};

/// What went wrong, independent of which service raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input.
    InvalidArgument,

    /// A referenced record is absent or not owned by the caller.
    NotFound,

    /// The requested quantity exceeds available stock.
    InsufficientStock { available: u32 },

    /// The pincode is not serviceable.
    DeliveryUnavailable,

    /// The record is not in a state that allows the operation.
    InvalidState,

    /// Checkout was attempted with no lines.
    EmptyCart,

    /// Storage fault or corrupt data.
    Internal,
}

impl ErrorKind {
    /// Whether the caller can correct the request and retry.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => f.write_str("invalid argument"),
            Self::NotFound => f.write_str("not found"),
            Self::InsufficientStock { available } => {
                write!(f, "insufficient stock ({available} available)")
            }
            Self::DeliveryUnavailable => f.write_str("delivery unavailable"),
            Self::InvalidState => f.write_str("invalid state"),
            Self::EmptyCart => f.write_str("empty cart"),
            Self::Internal => f.write_str("internal error"),
        }
    }
}

/// Renders `error` followed by each of its sources, joined by `: `.
///
/// Service errors keep their storage cause behind a generic message, so this is
/// what gets logged where a failure leaves the crate.
#[must_use]
pub fn report(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }

    rendered
}

#[cfg(test)]
mod tests {
    use crate::domain::{carts::CartsServiceError, orders::OrdersServiceError};

    use super::*;

    #[test]
    fn report_includes_storage_cause() {
        let error = CartsServiceError::Sql(sqlx::Error::PoolTimedOut);

        assert_eq!(error.to_string(), "storage error");
        assert_eq!(error.kind(), ErrorKind::Internal);
        assert_eq!(
            report(&error),
            format!("storage error: {}", sqlx::Error::PoolTimedOut)
        );
    }

    #[test]
    fn report_without_source_is_display() {
        let error = OrdersServiceError::EmptyCart;

        assert_eq!(report(&error), error.to_string());
    }
}
