//! Payments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use serde_json::Value;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use storefront::status::PaymentMethod;

use crate::{
    database::{amount_param, try_get_amount, try_get_parsed},
    domain::{
        orders::records::OrderUuid,
        payments::records::{PaymentRecord, PaymentUuid},
    },
};

const CREATE_PAYMENT_SQL: &str = include_str!("sql/create_payment.sql");
const GET_PAYMENT_SQL: &str = include_str!("sql/get_payment.sql");
const LOCK_PAYMENT_SQL: &str = include_str!("sql/lock_payment.sql");
const MARK_PAID_SQL: &str = include_str!("sql/mark_paid.sql");
const MARK_FAILED_SQL: &str = include_str!("sql/mark_failed.sql");
const MARK_REFUNDED_SQL: &str = include_str!("sql/mark_refunded.sql");
const LIST_PAYMENTS_SQL: &str = include_str!("sql/list_payments.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        payment_id: &str,
        order: OrderUuid,
        amount: u64,
        method: PaymentMethod,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(CREATE_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .bind(payment_id)
            .bind(order.into_uuid())
            .bind(amount_param(amount)?)
            .bind(method.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(GET_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn lock_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LOCK_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Settles the payment. Absent gateway details keep any stored values.
    pub(crate) async fn mark_paid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        transaction_id: Option<&str>,
        gateway_response: Option<&Value>,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(MARK_PAID_SQL)
            .bind(payment.into_uuid())
            .bind(transaction_id)
            .bind(gateway_response)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn mark_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        reason: &str,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(MARK_FAILED_SQL)
            .bind(payment.into_uuid())
            .bind(reason)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn mark_refunded(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        reason: Option<&str>,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(MARK_REFUNDED_SQL)
            .bind(payment.into_uuid())
            .bind(reason)
            .fetch_one(&mut **tx)
            .await
    }

    /// Payments of an order, newest first.
    pub(crate) async fn list_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LIST_PAYMENTS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            payment_id: row.try_get("payment_id")?,
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            amount: try_get_amount(row, "amount")?,
            method: try_get_parsed(row, "method")?,
            status: try_get_parsed(row, "status")?,
            transaction_id: row.try_get("transaction_id")?,
            gateway_response: row.try_get("gateway_response")?,
            failure_reason: row.try_get("failure_reason")?,
            refund_reason: row.try_get("refund_reason")?,
            initiated_at: row.try_get::<SqlxTimestamp, _>("initiated_at")?.to_jiff(),
            completed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("completed_at")?
                .map(SqlxTimestamp::to_jiff),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
