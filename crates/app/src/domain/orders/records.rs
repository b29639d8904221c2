//! Order Records

use jiff::Timestamp;
use storefront::status::{OrderStatus, PaymentStatus};

use crate::{
    domain::{
        addresses::records::AddressUuid,
        customers::UserUuid,
        pricing::records::{ProductUuid, VariantUuid},
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Line UUID
pub type OrderLineUuid = TypedUuid<OrderLineRecord>;

/// Order Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub order_number: String,
    pub user_uuid: UserUuid,

    /// `None` once the address has been deleted; the pincode is kept.
    pub address_uuid: Option<AddressUuid>,
    pub delivery_pincode: String,
    pub items_subtotal: u64,
    pub delivery_fee: u64,
    pub total: u64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub delivery_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub placed_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
}

/// Order Line Record
///
/// Product name, sku and price are copied at placement and never follow
/// later catalog changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineRecord {
    pub uuid: OrderLineUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub variant_uuid: VariantUuid,
    pub product_name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
    pub created_at: Timestamp,
}
