//! Cart Records

use jiff::Timestamp;

use crate::{
    domain::{
        carts::{models::CartOwner, token::CartToken},
        customers::UserUuid,
        pricing::{models::VariantPricing, records::VariantUuid},
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Line UUID
pub type CartLineUuid = TypedUuid<CartLineRecord>;

/// Cart Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRecord {
    pub uuid: CartUuid,

    /// `None` for anonymous carts.
    pub user_uuid: Option<UserUuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.user_uuid.is_none()
    }
}

/// Cart Line Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineRecord {
    pub uuid: CartLineUuid,
    pub cart_uuid: CartUuid,
    pub variant_uuid: VariantUuid,
    pub quantity: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A cart line joined with its variant's current price inputs and stock.
#[derive(Debug, Clone)]
pub(crate) struct PricedCartLine {
    pub line: CartLineRecord,
    pub pricing: VariantPricing,
    pub available: u32,
}

/// How a cart owner is matched in storage: exactly one column is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OwnerKey {
    User(UserUuid),
    TokenHash(String),
}

impl OwnerKey {
    pub(crate) fn user_uuid(&self) -> Option<uuid::Uuid> {
        match self {
            Self::User(user) => Some(user.into_uuid()),
            Self::TokenHash(_) => None,
        }
    }

    pub(crate) fn token_hash(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::TokenHash(hash) => Some(hash),
        }
    }
}

impl From<&CartToken> for OwnerKey {
    fn from(token: &CartToken) -> Self {
        Self::TokenHash(token.hash())
    }
}

impl From<&CartOwner> for OwnerKey {
    fn from(owner: &CartOwner) -> Self {
        match owner {
            CartOwner::User(user) => Self::User(*user),
            CartOwner::Anonymous(token) => token.into(),
        }
    }
}
