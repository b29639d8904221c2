//! Delivery Tracking Records

use jiff::Timestamp;
use storefront::status::OrderStatus;

use crate::{domain::orders::records::OrderUuid, uuids::TypedUuid};

/// Tracking UUID
pub type TrackingUuid = TypedUuid<TrackingRecord>;

/// Tracking Note UUID
pub type TrackingNoteUuid = TypedUuid<TrackingNote>;

/// Tracking Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRecord {
    pub uuid: TrackingUuid,
    pub order_uuid: OrderUuid,
    pub current_status: OrderStatus,
    pub estimated_delivery: Option<Timestamp>,
    pub courier_name: Option<String>,
    pub courier_phone: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One timestamped entry of a tracking log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingNote {
    pub uuid: TrackingNoteUuid,
    pub status: OrderStatus,
    pub note: Option<String>,
    pub created_at: Timestamp,
}
