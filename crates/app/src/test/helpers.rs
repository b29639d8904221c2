//! Test Helpers
//!
//! Catalog and delivery fixtures are written with raw SQL; everything else goes
//! through the services.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use smallvec::smallvec;
use sqlx::query;
use testresult::TestResult;
use uuid::Uuid;

use crate::domain::{
    addresses::{
        AddressesService, AddressesServiceError, data::NewAddress, records::AddressRecord,
    },
    customers::UserUuid,
    orders::{NewOrder, Order, OrderItem, OrderSource, OrdersService},
    pricing::records::{ProductUuid, VariantUuid},
};

use super::TestContext;

pub(crate) async fn insert_product(
    ctx: &TestContext,
    name: &str,
    base_price: u64,
) -> Result<ProductUuid, sqlx::Error> {
    let product = ProductUuid::new();

    query("INSERT INTO products (uuid, name, base_price) VALUES ($1, $2, $3)")
        .bind(product.into_uuid())
        .bind(name)
        .bind(i64::try_from(base_price).unwrap_or(i64::MAX))
        .execute(ctx.db.pool())
        .await?;

    Ok(product)
}

pub(crate) async fn insert_variant(
    ctx: &TestContext,
    product: ProductUuid,
    sku: &str,
    surcharge: u64,
) -> Result<VariantUuid, sqlx::Error> {
    let variant = VariantUuid::new();

    query("INSERT INTO variants (uuid, product_uuid, sku, surcharge) VALUES ($1, $2, $3, $4)")
        .bind(variant.into_uuid())
        .bind(product.into_uuid())
        .bind(sku)
        .bind(i64::try_from(surcharge).unwrap_or(i64::MAX))
        .execute(ctx.db.pool())
        .await?;

    Ok(variant)
}

pub(crate) async fn set_stock(
    ctx: &TestContext,
    variant: VariantUuid,
    quantity: u32,
) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO inventory (variant_uuid, quantity) VALUES ($1, $2) \
         ON CONFLICT (variant_uuid) DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()",
    )
    .bind(variant.into_uuid())
    .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
    .execute(ctx.db.pool())
    .await?;

    Ok(())
}

/// A fresh product with one variant priced `base_price + surcharge` and
/// `stock` units on hand.
pub(crate) async fn stocked_variant(
    ctx: &TestContext,
    base_price: u64,
    surcharge: u64,
    stock: u32,
) -> Result<VariantUuid, sqlx::Error> {
    let product = insert_product(ctx, "Test Product", base_price).await?;
    let sku = format!("SKU-{}", Uuid::now_v7().simple());
    let variant = insert_variant(ctx, product, &sku, surcharge).await?;

    set_stock(ctx, variant, stock).await?;

    Ok(variant)
}

pub(crate) async fn insert_deal(
    ctx: &TestContext,
    variant: VariantUuid,
    discount_basis_points: i32,
    starts_at: Option<Timestamp>,
    ends_at: Option<Timestamp>,
) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO deals (uuid, variant_uuid, discount_basis_points, starts_at, ends_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::now_v7())
    .bind(variant.into_uuid())
    .bind(discount_basis_points)
    .bind(starts_at.map(SqlxTimestamp::from))
    .bind(ends_at.map(SqlxTimestamp::from))
    .execute(ctx.db.pool())
    .await?;

    Ok(())
}

pub(crate) async fn deactivate_variant(
    ctx: &TestContext,
    variant: VariantUuid,
) -> Result<(), sqlx::Error> {
    query("UPDATE variants SET is_active = FALSE, updated_at = now() WHERE uuid = $1")
        .bind(variant.into_uuid())
        .execute(ctx.db.pool())
        .await?;

    Ok(())
}

/// Reprices the product behind `variant`.
pub(crate) async fn set_base_price(
    ctx: &TestContext,
    variant: VariantUuid,
    base_price: u64,
) -> Result<(), sqlx::Error> {
    query(
        "UPDATE products SET base_price = $2, updated_at = now() \
         WHERE uuid = (SELECT product_uuid FROM variants WHERE uuid = $1)",
    )
    .bind(variant.into_uuid())
    .bind(i64::try_from(base_price).unwrap_or(i64::MAX))
    .execute(ctx.db.pool())
    .await?;

    Ok(())
}

/// Upserts a serviceable area so tests can call it repeatedly.
pub(crate) async fn insert_location(
    ctx: &TestContext,
    pincode: &str,
    delivery_fee: u64,
    minimum_order: u64,
    is_available: bool,
) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO delivery_locations \
             (uuid, pincode, area_name, city, state, delivery_fee, minimum_order, is_available) \
         VALUES ($1, $2, 'Test Area', 'Mandi', 'Himachal Pradesh', $3, $4, $5) \
         ON CONFLICT (pincode) DO UPDATE SET \
             delivery_fee = EXCLUDED.delivery_fee, \
             minimum_order = EXCLUDED.minimum_order, \
             is_available = EXCLUDED.is_available, \
             updated_at = now()",
    )
    .bind(Uuid::now_v7())
    .bind(pincode)
    .bind(i64::try_from(delivery_fee).unwrap_or(i64::MAX))
    .bind(i64::try_from(minimum_order).unwrap_or(i64::MAX))
    .bind(is_available)
    .execute(ctx.db.pool())
    .await?;

    Ok(())
}

pub(crate) fn new_address(pincode: &str) -> NewAddress {
    NewAddress {
        title: "Home".to_string(),
        full_address: "12 Mall Road".to_string(),
        landmark: None,
        pincode: pincode.to_string(),
        phone: "9876543210".to_string(),
        is_default: false,
    }
}

pub(crate) async fn create_address(
    ctx: &TestContext,
    user: UserUuid,
    pincode: &str,
) -> Result<AddressRecord, AddressesServiceError> {
    ctx.addresses
        .create_address(user, new_address(pincode))
        .await
}

/// A customer with one placed order: a single 100.00 item delivered to a
/// serviceable pincode for a 50.00 fee.
pub(crate) async fn placed_order(ctx: &TestContext) -> TestResult<(UserUuid, Order)> {
    insert_location(ctx, "175001", 50_00, 200_00, true).await?;

    let user = UserUuid::new();
    let variant = stocked_variant(ctx, 100_00, 0, 10).await?;
    let address = create_address(ctx, user, "175001").await?;

    let order = ctx
        .orders
        .place_order(
            user,
            NewOrder {
                address_uuid: address.uuid,
                source: OrderSource::Items(smallvec![OrderItem {
                    variant_uuid: variant,
                    quantity: 1,
                }]),
                delivery_notes: None,
            },
        )
        .await?;

    Ok((user, order))
}
