//! Storefront
//!
//! Pure checkout rules for the storefront: unit pricing with deals, delivery fee
//! quoting, order totals and the order/payment status machines. Nothing in this
//! crate performs I/O; the application crate feeds it values read from storage.

pub mod checkout;
pub mod delivery;
pub mod inventory;
pub mod pricing;
pub mod status;
