//! Storefront Domain Concerns

pub mod addresses;
pub mod carts;
pub mod customers;
pub mod delivery;
pub mod errors;
pub mod inventory;
pub mod orders;
pub mod payments;
pub mod pricing;
pub mod tracking;
