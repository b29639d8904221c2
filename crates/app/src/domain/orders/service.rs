//! Orders service.

use async_trait::async_trait;
use jiff::{Span, Timestamp};
use mockall::automock;
use sqlx::{Postgres, Transaction};
use storefront::{
    checkout::OrderTotals,
    delivery::Pincode,
    inventory,
    status::OrderStatus,
};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        addresses::repository::PgAddressesRepository,
        carts::{
            records::OwnerKey,
            repositories::{PgCartLinesRepository, PgCartsRepository},
        },
        customers::UserUuid,
        delivery::repository::PgDeliveryRepository,
        inventory::repository::PgInventoryRepository,
        orders::{
            data::{NewOrder, NewOrderLine, OrderItem, OrderShell, OrderSource, coalesce_items},
            errors::OrdersServiceError,
            models::Order,
            records::{OrderLineRecord, OrderLineUuid, OrderRecord, OrderUuid},
            repositories::{PgOrderLinesRepository, PgOrdersRepository, PlacedTotals},
        },
        pricing::repository::PgPricingRepository,
        tracking::{
            records::TrackingUuid, repository::PgTrackingRepository,
            transitions::OrderTransitions,
        },
    },
    money::{self, AmountError, to_minor, to_money},
};

const ORDER_PLACED_NOTE: &str = "Order placed";
const ORDER_CANCELLED_NOTE: &str = "Order cancelled by customer";

/// `ORD`, the UTC placement time to the second, then 8 hex digits of the order uuid.
#[must_use]
pub fn order_number(placed_at: Timestamp, order: OrderUuid) -> String {
    let bytes = order.into_uuid().into_bytes();
    let suffix = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    format!("ORD{}{suffix:08X}", placed_at.strftime("%Y%m%d%H%M%S"))
}

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    lines: PgOrderLinesRepository,
    addresses: PgAddressesRepository,
    delivery: PgDeliveryRepository,
    carts: PgCartsRepository,
    cart_lines: PgCartLinesRepository,
    pricing: PgPricingRepository,
    inventory: PgInventoryRepository,
    tracking: PgTrackingRepository,
    transitions: OrderTransitions,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            lines: PgOrderLinesRepository::new(),
            addresses: PgAddressesRepository::new(),
            delivery: PgDeliveryRepository::new(),
            carts: PgCartsRepository::new(),
            cart_lines: PgCartLinesRepository::new(),
            pricing: PgPricingRepository::new(),
            inventory: PgInventoryRepository::new(),
            tracking: PgTrackingRepository::new(),
            transitions: OrderTransitions::new(),
        }
    }

    /// Prices one item at `now` and writes its snapshot after locking and
    /// re-checking its stock.
    async fn snapshot_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        item: OrderItem,
        now: Timestamp,
    ) -> Result<OrderLineRecord, OrdersServiceError> {
        let variant = item.variant_uuid;

        let pricing = self
            .pricing
            .find_variant_pricing(tx, variant, now)
            .await?
            .filter(|pricing| pricing.is_active)
            .ok_or(OrdersServiceError::VariantNotFound(variant))?;

        let available = self.inventory.lock_available(tx, variant).await?;

        if !inventory::can_satisfy(available, item.quantity) {
            warn!(%variant, requested = item.quantity, available, "insufficient stock at checkout");

            return Err(OrdersServiceError::InsufficientStock { variant, available });
        }

        let unit_price = pricing.unit_price()?;
        let line_total = money::line_total(unit_price, item.quantity)?;

        let line = self
            .lines
            .create_line(
                tx,
                &NewOrderLine {
                    uuid: OrderLineUuid::new(),
                    order_uuid: order,
                    product_uuid: pricing.product_uuid,
                    variant_uuid: variant,
                    product_name: pricing.product_name,
                    sku: pricing.sku,
                    quantity: item.quantity,
                    unit_price,
                    line_total,
                },
            )
            .await?;

        Ok(line)
    }

    async fn with_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: OrderRecord,
    ) -> Result<Order, OrdersServiceError> {
        let lines = self.lines.list_lines(tx, &[record.uuid]).await?;

        Ok(Order { record, lines })
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.place_order",
        skip(self, order),
        fields(user_uuid = %user, order_uuid = tracing::field::Empty),
        err
    )]
    async fn place_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<Order, OrdersServiceError> {
        let NewOrder {
            address_uuid,
            source,
            delivery_notes,
        } = order;

        let delivery_notes = delivery_notes
            .map(|notes| notes.trim().to_owned())
            .filter(|notes| !notes.is_empty());

        let mut tx = self.db.begin_transaction().await?;

        let address = self
            .addresses
            .get_address(&mut tx, user, address_uuid)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => OrdersServiceError::AddressNotFound,
                other => other.into(),
            })?;

        let pincode = Pincode::parse(&address.pincode)?;

        let location = self
            .delivery
            .find_available_location(&mut tx, &pincode)
            .await?
            .ok_or(OrdersServiceError::DeliveryUnavailable)?;

        let (items, cart) = match source {
            OrderSource::Cart => {
                let cart = self
                    .carts
                    .lock_cart(&mut tx, &OwnerKey::User(user))
                    .await?
                    .ok_or(OrdersServiceError::EmptyCart)?;

                let lines = self.cart_lines.list_lines(&mut tx, cart.uuid).await?;
                let items = coalesce_items(lines.iter().map(|line| OrderItem {
                    variant_uuid: line.variant_uuid,
                    quantity: line.quantity,
                }))?;

                (items, Some(cart.uuid))
            }
            OrderSource::Items(items) => (coalesce_items(items)?, None),
        };

        if items.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        let uuid = OrderUuid::new();
        let now = Timestamp::now();
        let number = order_number(now, uuid);

        tracing::Span::current().record("order_uuid", tracing::field::display(uuid));

        self.orders
            .create_order(
                &mut tx,
                &OrderShell {
                    uuid,
                    order_number: &number,
                    user_uuid: user,
                    address_uuid: address.uuid,
                    delivery_pincode: pincode.as_str(),
                    delivery_notes: delivery_notes.as_deref(),
                },
            )
            .await?;

        let mut lines = Vec::with_capacity(items.len());

        for item in items {
            lines.push(self.snapshot_line(&mut tx, uuid, item, now).await?);
        }

        let subtotal = money::sum(lines.iter().map(|line| line.line_total))?;
        let totals = OrderTotals::compute(to_money(subtotal)?, &location.fee_schedule()?)
            .map_err(AmountError::from)?;

        let placed = self
            .orders
            .place_order(
                &mut tx,
                uuid,
                PlacedTotals {
                    items_subtotal: to_minor(&totals.items_subtotal)?,
                    delivery_fee: to_minor(&totals.delivery_fee)?,
                    total: to_minor(&totals.total)?,
                },
                now,
            )
            .await?;

        let estimated_delivery = Span::new()
            .try_hours(i64::from(location.estimated_delivery_hours))
            .and_then(|span| now.checked_add(span))
            .ok();

        let tracking = self
            .tracking
            .create_tracking(
                &mut tx,
                TrackingUuid::new(),
                uuid,
                OrderStatus::Placed,
                estimated_delivery,
            )
            .await?;

        self.tracking
            .add_note(&mut tx, tracking.uuid, OrderStatus::Placed, Some(ORDER_PLACED_NOTE))
            .await?;

        if let Some(cart) = cart {
            self.cart_lines.clear_lines(&mut tx, cart).await?;
            self.carts.touch_cart(&mut tx, cart).await?;
        }

        tx.commit().await?;

        info!(
            order_number = %placed.order_number,
            total = placed.total,
            lines = lines.len(),
            "placed order"
        );

        Ok(Order {
            record: placed,
            lines,
        })
    }

    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.orders.get_customer_order(&mut tx, user, order).await?;
        let order = self.with_lines(&mut tx, record).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn lookup_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.orders.get_order(&mut tx, order).await?;
        let order = self.with_lines(&mut tx, record).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self.orders.list_customer_orders(&mut tx, user).await?;
        let uuids: Vec<OrderUuid> = records.iter().map(|record| record.uuid).collect();
        let lines = self.lines.list_lines(&mut tx, &uuids).await?;

        tx.commit().await?;

        Ok(Order::assemble(records, lines))
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self, reason),
        fields(user_uuid = %user, order_uuid = %order),
        err
    )]
    async fn cancel_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
        reason: Option<String>,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let locked = self.orders.lock_customer_order(&mut tx, user, order).await?;

        let note = reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .unwrap_or(ORDER_CANCELLED_NOTE);

        let (record, _) = self
            .transitions
            .apply(&mut tx, &locked, OrderStatus::Cancelled, Some(note))
            .await?;

        let order = self.with_lines(&mut tx, record).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn pending_payments(
        &self,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let orders = self.orders.list_pending_payments(&mut tx, user).await?;

        tx.commit().await?;

        Ok(orders)
    }
}

/// Checkout and order history.
///
/// Placement runs in one transaction: the order, its line snapshots, the
/// tracking record and the cart clear commit together or not at all.
#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Converts the customer's cart or an explicit item list into a placed order.
    async fn place_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<Order, OrdersServiceError>;

    /// An order owned by the customer, with its lines.
    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError>;

    /// An order by id regardless of owner.
    async fn lookup_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// The customer's placed orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError>;

    /// Cancels a placed or confirmed order.
    async fn cancel_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
        reason: Option<String>,
    ) -> Result<Order, OrdersServiceError>;

    /// Open orders still awaiting payment, newest first.
    async fn pending_payments(
        &self,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;
}
