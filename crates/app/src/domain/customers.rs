//! Customers
//!
//! Identity is issued elsewhere; this crate only keys records by the caller's user id.

use crate::uuids::TypedUuid;

/// Customer Record
#[derive(Debug)]
pub struct CustomerRecord;

/// Authenticated customer id.
pub type UserUuid = TypedUuid<CustomerRecord>;
