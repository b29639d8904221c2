//! Inventory service errors.

use sqlx::Error;
use thiserror::Error;

use crate::domain::errors::ErrorKind;

#[derive(Debug, Error)]
pub enum InventoryServiceError {
    #[error("variant not found")]
    NotFound,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl InventoryServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::Sql(_) => ErrorKind::Internal,
        }
    }
}

impl From<Error> for InventoryServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
