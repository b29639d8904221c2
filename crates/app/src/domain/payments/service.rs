//! Payment ledger service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde_json::Value;
use sqlx::{Postgres, Transaction};
use storefront::status::{OrderStatus, PaymentMethod, PaymentStatus};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        orders::{
            records::{OrderRecord, OrderUuid},
            repositories::PgOrdersRepository,
        },
        payments::{
            errors::PaymentsServiceError,
            records::{PaymentRecord, PaymentUuid},
            repository::PgPaymentsRepository,
        },
    },
};

/// Customer-facing payment reference: `PAY`, the UTC initiation time and six hex
/// digits taken from the payment uuid.
#[must_use]
pub fn payment_id(initiated_at: Timestamp, payment: PaymentUuid) -> String {
    let bytes = payment.into_uuid().into_bytes();
    let suffix = u32::from_be_bytes([0, bytes[13], bytes[14], bytes[15]]);

    format!("PAY{}{suffix:06X}", initiated_at.strftime("%Y%m%d%H%M%S"))
}

#[derive(Debug, Clone)]
pub struct PgPaymentsService {
    db: Db,
    orders: PgOrdersRepository,
    repository: PgPaymentsRepository,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            repository: PgPaymentsRepository::new(),
        }
    }

    /// Locks the owning order, then the payment, and checks the payment may
    /// move to `next`. A cancelled order only accepts refunds.
    async fn lock_for_transition(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        next: PaymentStatus,
    ) -> Result<(OrderRecord, PaymentRecord), PaymentsServiceError> {
        let unlocked = self.repository.get_payment(tx, payment).await?;

        let order = self
            .orders
            .lock_order(tx, unlocked.order_uuid)
            .await
            .map_err(order_error)?;

        if order.status == OrderStatus::Cancelled
            && matches!(next, PaymentStatus::Paid | PaymentStatus::Failed)
        {
            return Err(PaymentsServiceError::OrderNotPayable {
                status: order.status,
                payment_status: order.payment_status,
            });
        }

        let locked = self.repository.lock_payment(tx, payment).await?;

        if !locked.status.can_transition_to(next) {
            return Err(PaymentsServiceError::InvalidTransition {
                from: locked.status,
                to: next,
            });
        }

        Ok((order, locked))
    }

    async fn settle_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
        outcome: PaymentStatus,
    ) -> Result<OrderRecord, PaymentsServiceError> {
        let settled = order.payment_status.settle(outcome);

        if settled == order.payment_status {
            return Ok(order.clone());
        }

        Ok(self
            .orders
            .update_payment_status(tx, order.uuid, settled)
            .await?)
    }
}

fn order_error(error: sqlx::Error) -> PaymentsServiceError {
    match error {
        sqlx::Error::RowNotFound => PaymentsServiceError::OrderNotFound,
        other => PaymentsServiceError::Sql(other),
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    #[tracing::instrument(
        name = "payments.service.record_payment",
        skip(self),
        fields(order_uuid = %order, method = %method, payment_id = tracing::field::Empty),
        err
    )]
    async fn record_payment(
        &self,
        order: OrderUuid,
        method: PaymentMethod,
        amount: u64,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        if amount == 0 {
            return Err(PaymentsServiceError::InvalidAmount);
        }

        let mut tx = self.db.begin_transaction().await?;

        let locked = self
            .orders
            .lock_order(&mut tx, order)
            .await
            .map_err(order_error)?;

        if matches!(locked.status, OrderStatus::Cart | OrderStatus::Cancelled)
            || locked.payment_status.is_settled()
        {
            return Err(PaymentsServiceError::OrderNotPayable {
                status: locked.status,
                payment_status: locked.payment_status,
            });
        }

        if amount != locked.total {
            warn!(
                amount,
                order_total = locked.total,
                "payment amount differs from order total"
            );
        }

        let uuid = PaymentUuid::new();
        let reference = payment_id(Timestamp::now(), uuid);

        tracing::Span::current().record("payment_id", reference.as_str());

        let payment = self
            .repository
            .create_payment(&mut tx, uuid, &reference, order, amount, method)
            .await?;

        tx.commit().await?;

        info!("recorded payment");

        Ok(payment)
    }

    #[tracing::instrument(
        name = "payments.service.mark_paid",
        skip(self, transaction_id, gateway_response),
        fields(payment_uuid = %payment),
        err
    )]
    async fn mark_paid(
        &self,
        payment: PaymentUuid,
        transaction_id: Option<String>,
        gateway_response: Option<Value>,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let (order, _) = self
            .lock_for_transition(&mut tx, payment, PaymentStatus::Paid)
            .await?;

        if order.payment_status == PaymentStatus::Paid {
            warn!(order_uuid = %order.uuid, "order already paid, recording another payment");
        }

        let record = self
            .repository
            .mark_paid(
                &mut tx,
                payment,
                transaction_id.as_deref(),
                gateway_response.as_ref(),
            )
            .await?;

        self.settle_order(&mut tx, &order, PaymentStatus::Paid).await?;

        tx.commit().await?;

        info!("payment settled");

        Ok(record)
    }

    #[tracing::instrument(
        name = "payments.service.mark_failed",
        skip(self, reason),
        fields(payment_uuid = %payment),
        err
    )]
    async fn mark_failed(
        &self,
        payment: PaymentUuid,
        reason: String,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let reason = reason.trim();

        if reason.is_empty() {
            return Err(PaymentsServiceError::MissingField("failure reason"));
        }

        let mut tx = self.db.begin_transaction().await?;

        let (order, _) = self
            .lock_for_transition(&mut tx, payment, PaymentStatus::Failed)
            .await?;

        let record = self.repository.mark_failed(&mut tx, payment, reason).await?;

        self.settle_order(&mut tx, &order, PaymentStatus::Failed)
            .await?;

        tx.commit().await?;

        warn!(reason, "payment failed");

        Ok(record)
    }

    #[tracing::instrument(
        name = "payments.service.mark_refunded",
        skip(self, reason),
        fields(payment_uuid = %payment),
        err
    )]
    async fn mark_refunded(
        &self,
        payment: PaymentUuid,
        reason: Option<String>,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let (order, _) = self
            .lock_for_transition(&mut tx, payment, PaymentStatus::Refunded)
            .await?;

        let reason = reason.as_deref().map(str::trim).filter(|r| !r.is_empty());

        let record = self
            .repository
            .mark_refunded(&mut tx, payment, reason)
            .await?;

        self.settle_order(&mut tx, &order, PaymentStatus::Refunded)
            .await?;

        tx.commit().await?;

        info!("payment refunded");

        Ok(record)
    }

    async fn get_payment(
        &self,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.get_payment(&mut tx, payment).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_payments(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.orders
            .get_order(&mut tx, order)
            .await
            .map_err(order_error)?;

        let payments = self.repository.list_payments(&mut tx, order).await?;

        tx.commit().await?;

        Ok(payments)
    }
}

/// Payment attempts against placed orders, and their effect on the order's
/// payment status.
#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Opens a pending payment for `amount` paise.
    async fn record_payment(
        &self,
        order: OrderUuid,
        method: PaymentMethod,
        amount: u64,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Settles a pending payment and marks the order paid.
    async fn mark_paid(
        &self,
        payment: PaymentUuid,
        transaction_id: Option<String>,
        gateway_response: Option<Value>,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    async fn mark_failed(
        &self,
        payment: PaymentUuid,
        reason: String,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    async fn mark_refunded(
        &self,
        payment: PaymentUuid,
        reason: Option<String>,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    async fn get_payment(
        &self,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Payments of an order, newest first.
    async fn list_payments(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<PaymentRecord>, PaymentsServiceError>;
}
