//! Pricing Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::try_get_amount,
    domain::pricing::{
        models::VariantPricing,
        records::{ProductUuid, VariantUuid},
    },
};

const GET_VARIANT_PRICING_SQL: &str = include_str!("sql/get_variant_pricing.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPricingRepository;

impl PgPricingRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Price inputs of a variant with the deal active at `point_in_time`.
    pub(crate) async fn find_variant_pricing(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
        point_in_time: Timestamp,
    ) -> Result<Option<VariantPricing>, sqlx::Error> {
        query_as::<Postgres, VariantPricing>(GET_VARIANT_PRICING_SQL)
            .bind(variant.into_uuid())
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for VariantPricing {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            variant_uuid: VariantUuid::from_uuid(row.try_get("variant_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            sku: row.try_get("sku")?,
            base_price: try_get_amount(row, "base_price")?,
            surcharge: try_get_amount(row, "surcharge")?,
            is_active: row.try_get("is_active")?,
            discount_basis_points: row.try_get("discount_basis_points")?,
        })
    }
}
