//! Addresses service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind as SqlErrorKind},
};
use storefront::delivery::PincodeError;
use thiserror::Error;

use crate::domain::errors::ErrorKind;

#[derive(Debug, Error)]
pub enum AddressesServiceError {
    #[error("address not found")]
    NotFound,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    InvalidPincode(#[from] PincodeError),

    #[error("another default address was set concurrently")]
    DefaultConflict,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl AddressesServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::MissingField(_) | Self::InvalidPincode(_) => ErrorKind::InvalidArgument,
            Self::DefaultConflict => ErrorKind::InvalidState,
            Self::Sql(_) => ErrorKind::Internal,
        }
    }
}

impl From<Error> for AddressesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(SqlErrorKind::UniqueViolation) => Self::DefaultConflict,
            Some(_) | None => Self::Sql(error),
        }
    }
}
