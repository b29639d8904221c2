//! Payment Records

use jiff::Timestamp;
use serde_json::Value;
use storefront::status::{PaymentMethod, PaymentStatus};

use crate::{domain::orders::records::OrderUuid, uuids::TypedUuid};

/// Payment UUID
pub type PaymentUuid = TypedUuid<PaymentRecord>;

/// Payment Record
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub uuid: PaymentUuid,

    /// Customer-facing reference, `PAY` + timestamp + hex.
    pub payment_id: String,
    pub order_uuid: OrderUuid,
    pub amount: u64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub gateway_response: Option<Value>,
    pub failure_reason: Option<String>,
    pub refund_reason: Option<String>,
    pub initiated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}
