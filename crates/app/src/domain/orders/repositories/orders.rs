//! Orders Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use storefront::status::{OrderStatus, PaymentStatus};
use uuid::Uuid;

use crate::{
    database::{amount_param, try_get_amount, try_get_parsed},
    domain::{
        addresses::records::AddressUuid,
        customers::UserUuid,
        orders::{
            data::OrderShell,
            records::{OrderRecord, OrderUuid},
        },
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const PLACE_ORDER_SQL: &str = include_str!("../sql/place_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const LOCK_CUSTOMER_ORDER_SQL: &str = include_str!("../sql/lock_customer_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const GET_CUSTOMER_ORDER_SQL: &str = include_str!("../sql/get_customer_order.sql");
const LIST_CUSTOMER_ORDERS_SQL: &str = include_str!("../sql/list_customer_orders.sql");
const LIST_PENDING_PAYMENTS_SQL: &str = include_str!("../sql/list_pending_payments.sql");
const UPDATE_STATUS_SQL: &str = include_str!("../sql/update_status.sql");
const UPDATE_PAYMENT_STATUS_SQL: &str = include_str!("../sql/update_payment_status.sql");

/// Amounts frozen onto an order when it is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlacedTotals {
    pub items_subtotal: u64,
    pub delivery_fee: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Inserts an order shell in the `cart` state with zero totals.
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        shell: &OrderShell<'_>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(shell.uuid.into_uuid())
            .bind(shell.order_number)
            .bind(shell.user_uuid.into_uuid())
            .bind(shell.address_uuid.into_uuid())
            .bind(shell.delivery_pincode)
            .bind(shell.delivery_notes)
            .fetch_one(&mut **tx)
            .await
    }

    /// Moves a shell to `placed` with its final totals.
    pub(crate) async fn place_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        totals: PlacedTotals,
        placed_at: Timestamp,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(PLACE_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(amount_param(totals.items_subtotal)?)
            .bind(amount_param(totals.delivery_fee)?)
            .bind(amount_param(totals.total)?)
            .bind(SqlxTimestamp::from(placed_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn lock_customer_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_CUSTOMER_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_customer_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_CUSTOMER_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Placed orders of a customer, newest first.
    pub(crate) async fn list_customer_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_CUSTOMER_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Open orders still waiting for payment, newest first.
    pub(crate) async fn list_pending_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_PENDING_PAYMENTS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        delivered_at: Option<Timestamp>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(delivered_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_payment_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_PAYMENT_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: row.try_get("order_number")?,
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            address_uuid: row
                .try_get::<Option<Uuid>, _>("address_uuid")?
                .map(AddressUuid::from_uuid),
            delivery_pincode: row.try_get("delivery_pincode")?,
            items_subtotal: try_get_amount(row, "items_subtotal")?,
            delivery_fee: try_get_amount(row, "delivery_fee")?,
            total: try_get_amount(row, "total")?,
            status: try_get_parsed(row, "status")?,
            payment_status: try_get_parsed(row, "payment_status")?,
            delivery_notes: row.try_get("delivery_notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            placed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("placed_at")?
                .map(SqlxTimestamp::to_jiff),
            delivered_at: row
                .try_get::<Option<SqlxTimestamp>, _>("delivered_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
