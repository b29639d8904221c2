//! Delivery Tracking Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use storefront::status::OrderStatus;

use crate::{
    database::try_get_parsed,
    domain::{
        orders::records::OrderUuid,
        tracking::records::{TrackingNote, TrackingNoteUuid, TrackingRecord, TrackingUuid},
    },
};

const CREATE_TRACKING_SQL: &str = include_str!("sql/create_tracking.sql");
const ADD_NOTE_SQL: &str = include_str!("sql/add_note.sql");
const LOCK_TRACKING_SQL: &str = include_str!("sql/lock_tracking.sql");
const GET_TRACKING_SQL: &str = include_str!("sql/get_tracking.sql");
const UPDATE_STATUS_SQL: &str = include_str!("sql/update_status.sql");
const ASSIGN_COURIER_SQL: &str = include_str!("sql/assign_courier.sql");
const LIST_NOTES_SQL: &str = include_str!("sql/list_notes.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTrackingRepository;

impl PgTrackingRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_tracking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tracking: TrackingUuid,
        order: OrderUuid,
        status: OrderStatus,
        estimated_delivery: Option<Timestamp>,
    ) -> Result<TrackingRecord, sqlx::Error> {
        query_as::<Postgres, TrackingRecord>(CREATE_TRACKING_SQL)
            .bind(tracking.into_uuid())
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(estimated_delivery.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    /// Appends a log entry stamped with the wall clock at insert time.
    pub(crate) async fn add_note(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tracking: TrackingUuid,
        status: OrderStatus,
        note: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        query(ADD_NOTE_SQL)
            .bind(TrackingNoteUuid::new().into_uuid())
            .bind(tracking.into_uuid())
            .bind(status.as_str())
            .bind(note)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn lock_tracking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<TrackingRecord, sqlx::Error> {
        query_as::<Postgres, TrackingRecord>(LOCK_TRACKING_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_tracking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<TrackingRecord, sqlx::Error> {
        query_as::<Postgres, TrackingRecord>(GET_TRACKING_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tracking: TrackingUuid,
        status: OrderStatus,
    ) -> Result<TrackingRecord, sqlx::Error> {
        query_as::<Postgres, TrackingRecord>(UPDATE_STATUS_SQL)
            .bind(tracking.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn assign_courier(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        name: &str,
        phone: &str,
    ) -> Result<TrackingRecord, sqlx::Error> {
        query_as::<Postgres, TrackingRecord>(ASSIGN_COURIER_SQL)
            .bind(order.into_uuid())
            .bind(name)
            .bind(phone)
            .fetch_one(&mut **tx)
            .await
    }

    /// Log entries, newest first.
    pub(crate) async fn list_notes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tracking: TrackingUuid,
    ) -> Result<Vec<TrackingNote>, sqlx::Error> {
        query_as::<Postgres, TrackingNote>(LIST_NOTES_SQL)
            .bind(tracking.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for TrackingRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TrackingUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            current_status: try_get_parsed(row, "current_status")?,
            estimated_delivery: row
                .try_get::<Option<SqlxTimestamp>, _>("estimated_delivery")?
                .map(SqlxTimestamp::to_jiff),
            courier_name: row.try_get("courier_name")?,
            courier_phone: row.try_get("courier_phone")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TrackingNote {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TrackingNoteUuid::from_uuid(row.try_get("uuid")?),
            status: try_get_parsed(row, "status")?,
            note: row.try_get("note")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
