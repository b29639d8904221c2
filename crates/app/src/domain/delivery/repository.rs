//! Delivery Locations Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use storefront::delivery::Pincode;

use crate::{
    database::{try_get_amount, try_get_quantity},
    domain::delivery::records::{DeliveryLocation, DeliveryLocationUuid},
};

const FIND_AVAILABLE_LOCATION_SQL: &str = include_str!("sql/find_available_location.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDeliveryRepository;

impl PgDeliveryRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_available_location(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        pincode: &Pincode,
    ) -> Result<Option<DeliveryLocation>, sqlx::Error> {
        query_as::<Postgres, DeliveryLocation>(FIND_AVAILABLE_LOCATION_SQL)
            .bind(pincode.as_str())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for DeliveryLocation {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: DeliveryLocationUuid::from_uuid(row.try_get("uuid")?),
            pincode: row.try_get("pincode")?,
            area_name: row.try_get("area_name")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            delivery_fee: try_get_amount(row, "delivery_fee")?,
            minimum_order: try_get_amount(row, "minimum_order")?,
            estimated_delivery_hours: try_get_quantity(row, "estimated_delivery_hours")?,
            is_available: row.try_get("is_available")?,
        })
    }
}
