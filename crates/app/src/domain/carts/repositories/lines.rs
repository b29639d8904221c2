//! Cart Lines Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::{quantity_param, try_get_quantity},
    domain::{
        carts::records::{CartLineRecord, CartLineUuid, CartUuid, PricedCartLine},
        pricing::{models::VariantPricing, records::VariantUuid},
    },
};

const LIST_PRICED_LINES_SQL: &str = include_str!("../sql/list_priced_lines.sql");
const LIST_LINES_SQL: &str = include_str!("../sql/list_lines.sql");
const FIND_LINE_SQL: &str = include_str!("../sql/find_line.sql");
const FIND_LINE_FOR_VARIANT_SQL: &str = include_str!("../sql/find_line_for_variant.sql");
const UPSERT_LINE_SQL: &str = include_str!("../sql/upsert_line.sql");
const UPDATE_QUANTITY_SQL: &str = include_str!("../sql/update_quantity.sql");
const DELETE_LINE_SQL: &str = include_str!("../sql/delete_line.sql");
const CLEAR_LINES_SQL: &str = include_str!("../sql/clear_lines.sql");
const MERGE_OVERLAPPING_LINES_SQL: &str = include_str!("../sql/merge_overlapping_lines.sql");
const MOVE_LINES_SQL: &str = include_str!("../sql/move_lines.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartLinesRepository;

impl PgCartLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Lines with price inputs and stock as of `point_in_time`, oldest first.
    pub(crate) async fn list_priced_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        point_in_time: Timestamp,
    ) -> Result<Vec<PricedCartLine>, sqlx::Error> {
        query_as::<Postgres, PricedCartLine>(LIST_PRICED_LINES_SQL)
            .bind(cart.into_uuid())
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_all(&mut **tx)
            .await
    }

    /// Lines ordered by variant uuid.
    pub(crate) async fn list_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartLineRecord>, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(LIST_LINES_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn find_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        line: CartLineUuid,
    ) -> Result<Option<CartLineRecord>, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(FIND_LINE_SQL)
            .bind(line.into_uuid())
            .bind(cart.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_line_for_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        variant: VariantUuid,
    ) -> Result<Option<CartLineRecord>, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(FIND_LINE_FOR_VARIANT_SQL)
            .bind(cart.into_uuid())
            .bind(variant.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Sets the quantity of the cart's line for `variant`, creating it as `line` if absent.
    pub(crate) async fn upsert_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        line: CartLineUuid,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<CartLineRecord, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(UPSERT_LINE_SQL)
            .bind(line.into_uuid())
            .bind(cart.into_uuid())
            .bind(variant.into_uuid())
            .bind(quantity_param(quantity)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        line: CartLineUuid,
        quantity: u32,
    ) -> Result<CartLineRecord, sqlx::Error> {
        query_as::<Postgres, CartLineRecord>(UPDATE_QUANTITY_SQL)
            .bind(line.into_uuid())
            .bind(cart.into_uuid())
            .bind(quantity_param(quantity)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        line: CartLineUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_LINE_SQL)
            .bind(line.into_uuid())
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_LINES_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Adds `source` quantities onto `target` lines of the same variant.
    pub(crate) async fn merge_overlapping_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        source: CartUuid,
        target: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MERGE_OVERLAPPING_LINES_SQL)
            .bind(source.into_uuid())
            .bind(target.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Moves `source` lines whose variant `target` does not hold yet.
    pub(crate) async fn move_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        source: CartUuid,
        target: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MOVE_LINES_SQL)
            .bind(source.into_uuid())
            .bind(target.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartLineRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartLineUuid::from_uuid(row.try_get("uuid")?),
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_uuid")?),
            variant_uuid: VariantUuid::from_uuid(row.try_get("variant_uuid")?),
            quantity: try_get_quantity(row, "quantity")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PricedCartLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            line: CartLineRecord::from_row(row)?,
            pricing: VariantPricing::from_row(row)?,
            available: try_get_quantity(row, "available")?,
        })
    }
}
