//! Carts

pub mod errors;
pub mod models;
pub mod records;
pub(crate) mod repositories;
pub mod service;
pub mod token;

pub use errors::CartsServiceError;
pub use models::{AnonymousCart, Cart, CartLine, CartOwner, CartSummary, LineUpdate};
pub use service::*;
pub use token::{CartToken, CartTokenError};
