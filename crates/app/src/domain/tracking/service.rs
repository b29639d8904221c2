//! Delivery tracking service.

use async_trait::async_trait;
use mockall::automock;
use storefront::status::OrderStatus;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        orders::{records::OrderUuid, repositories::PgOrdersRepository},
        tracking::{
            errors::TrackingServiceError, models::Tracking, records::TrackingRecord,
            repository::PgTrackingRepository, transitions::OrderTransitions,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgTrackingService {
    db: Db,
    orders: PgOrdersRepository,
    repository: PgTrackingRepository,
    transitions: OrderTransitions,
}

impl PgTrackingService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            repository: PgTrackingRepository::new(),
            transitions: OrderTransitions::new(),
        }
    }
}

#[async_trait]
impl TrackingService for PgTrackingService {
    #[tracing::instrument(
        name = "tracking.service.update_status",
        skip(self, note),
        fields(order_uuid = %order, status = %status),
        err
    )]
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Tracking, TrackingServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let locked = self.orders.lock_order(&mut tx, order).await?;

        let (_, record) = self
            .transitions
            .apply(&mut tx, &locked, status, note.as_deref())
            .await?;

        let notes = self.repository.list_notes(&mut tx, record.uuid).await?;

        tx.commit().await?;

        Ok(Tracking { record, notes })
    }

    #[tracing::instrument(
        name = "tracking.service.assign_courier",
        skip(self, name, phone),
        fields(order_uuid = %order),
        err
    )]
    async fn assign_courier(
        &self,
        order: OrderUuid,
        name: &str,
        phone: &str,
    ) -> Result<TrackingRecord, TrackingServiceError> {
        let name = name.trim();
        let phone = phone.trim();

        if name.is_empty() {
            return Err(TrackingServiceError::MissingField("courier name"));
        }

        if phone.is_empty() {
            return Err(TrackingServiceError::MissingField("courier phone"));
        }

        let mut tx = self.db.begin_transaction().await?;

        self.orders.lock_order(&mut tx, order).await?;

        let record = self
            .repository
            .assign_courier(&mut tx, order, name, phone)
            .await?;

        let note = format!("Courier assigned: {name}");

        self.repository
            .add_note(&mut tx, record.uuid, record.current_status, Some(&note))
            .await?;

        tx.commit().await?;

        info!("assigned courier");

        Ok(record)
    }

    async fn get_tracking(&self, order: OrderUuid) -> Result<Tracking, TrackingServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.get_tracking(&mut tx, order).await?;
        let notes = self.repository.list_notes(&mut tx, record.uuid).await?;

        tx.commit().await?;

        Ok(Tracking { record, notes })
    }
}

/// Fulfilment progress of placed orders.
#[automock]
#[async_trait]
pub trait TrackingService: Send + Sync {
    /// Moves the order forward (or cancels it), logging `note` and mirroring the
    /// status onto the order.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Tracking, TrackingServiceError>;

    async fn assign_courier(
        &self,
        order: OrderUuid,
        name: &str,
        phone: &str,
    ) -> Result<TrackingRecord, TrackingServiceError>;

    /// The tracking record with notes, newest first.
    async fn get_tracking(&self, order: OrderUuid) -> Result<Tracking, TrackingServiceError>;
}
