//! Delivery Tracking

pub mod errors;
pub mod models;
pub mod records;
pub(crate) mod repository;
pub mod service;
pub(crate) mod transitions;

pub use errors::TrackingServiceError;
pub use models::Tracking;
pub use service::*;
