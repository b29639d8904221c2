//! Order status transitions
//!
//! The tracking record owns the fulfilment status; the order row carries a
//! mirror of it. Both change together here and nowhere else.

use jiff::Timestamp;
use sqlx::{Postgres, Transaction};
use storefront::status::OrderStatus;
use tracing::info;

use crate::domain::{
    orders::{records::OrderRecord, repositories::PgOrdersRepository},
    tracking::{
        errors::TrackingServiceError, records::TrackingRecord, repository::PgTrackingRepository,
    },
};

#[derive(Debug, Clone, Default)]
pub(crate) struct OrderTransitions {
    orders: PgOrdersRepository,
    tracking: PgTrackingRepository,
}

impl OrderTransitions {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            orders: PgOrdersRepository::new(),
            tracking: PgTrackingRepository::new(),
        }
    }

    /// Moves a placed order to `next`. The caller must hold the order row lock.
    pub(crate) async fn apply(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
        next: OrderStatus,
        note: Option<&str>,
    ) -> Result<(OrderRecord, TrackingRecord), TrackingServiceError> {
        if !order.status.can_transition_to(next) {
            return Err(TrackingServiceError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let tracking = self.tracking.lock_tracking(tx, order.uuid).await?;

        self.tracking.add_note(tx, tracking.uuid, next, note).await?;

        let tracking = self.tracking.update_status(tx, tracking.uuid, next).await?;
        let delivered_at = (next == OrderStatus::Delivered).then(Timestamp::now);
        let updated = self
            .orders
            .update_status(tx, order.uuid, next, delivered_at)
            .await?;

        info!(
            order_uuid = %order.uuid,
            from = %order.status,
            to = %next,
            "order status changed"
        );

        Ok((updated, tracking))
    }
}
