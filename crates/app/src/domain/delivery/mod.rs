//! Delivery Eligibility

pub mod errors;
pub mod models;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::DeliveryServiceError;
pub use service::*;
