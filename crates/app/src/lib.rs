//! Postgres-backed storefront services: carts, checkout, payments and delivery tracking.

pub mod context;
pub mod database;
pub mod domain;
pub mod money;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;
