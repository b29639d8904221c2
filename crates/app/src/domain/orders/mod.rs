//! Orders

pub mod data;
pub mod errors;
pub mod models;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use data::{NewOrder, OrderItem, OrderSource};
pub use errors::OrdersServiceError;
pub use models::Order;
pub use service::*;
