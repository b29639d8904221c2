//! Payments

pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::PaymentsServiceError;
pub use records::{PaymentRecord, PaymentUuid};
pub use service::*;
