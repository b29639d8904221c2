//! Pricing service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::Db,
    domain::pricing::{
        errors::PricingServiceError, models::VariantPricing, records::VariantUuid,
        repository::PgPricingRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgPricingService {
    db: Db,
    repository: PgPricingRepository,
}

impl PgPricingService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPricingRepository::new(),
        }
    }
}

#[async_trait]
impl PricingService for PgPricingService {
    async fn get_variant_pricing(
        &self,
        variant: VariantUuid,
        point_in_time: Timestamp,
    ) -> Result<VariantPricing, PricingServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let pricing = self
            .repository
            .find_variant_pricing(&mut tx, variant, point_in_time)
            .await?
            .ok_or(PricingServiceError::NotFound)?;

        tx.commit().await?;

        Ok(pricing)
    }

    #[tracing::instrument(
        name = "pricing.service.unit_price",
        skip(self),
        fields(variant_uuid = %variant),
        err
    )]
    async fn unit_price(
        &self,
        variant: VariantUuid,
        point_in_time: Timestamp,
    ) -> Result<u64, PricingServiceError> {
        let pricing = self.get_variant_pricing(variant, point_in_time).await?;

        Ok(pricing.unit_price()?)
    }
}

#[automock]
#[async_trait]
pub trait PricingService: Send + Sync {
    /// Price inputs of a variant, with the deal active at `point_in_time`.
    async fn get_variant_pricing(
        &self,
        variant: VariantUuid,
        point_in_time: Timestamp,
    ) -> Result<VariantPricing, PricingServiceError>;

    /// Effective unit price of a variant at `point_in_time`, in minor units.
    async fn unit_price(
        &self,
        variant: VariantUuid,
        point_in_time: Timestamp,
    ) -> Result<u64, PricingServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, ToSpan};
    use testresult::TestResult;

    use crate::{
        domain::errors::ErrorKind,
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    async fn unit_price_without_deal_is_base_plus_surcharge() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = helpers::stocked_variant(&ctx, 100_00, 20_00, 10).await?;

        let price = ctx.pricing.unit_price(variant, Timestamp::now()).await?;

        assert_eq!(price, 120_00);

        Ok(())
    }

    #[tokio::test]
    async fn unit_price_applies_active_deal() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = helpers::stocked_variant(&ctx, 100_00, 20_00, 10).await?;

        helpers::insert_deal(&ctx, variant, 1_000, None, None).await?;

        let price = ctx.pricing.unit_price(variant, Timestamp::now()).await?;

        assert_eq!(price, 108_00);

        Ok(())
    }

    #[tokio::test]
    async fn unit_price_ignores_deal_outside_window() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = helpers::stocked_variant(&ctx, 100_00, 0, 10).await?;
        let now = Timestamp::now();

        helpers::insert_deal(
            &ctx,
            variant,
            5_000,
            Some(now.checked_add(1.hour())?),
            None,
        )
        .await?;

        assert_eq!(ctx.pricing.unit_price(variant, now).await?, 100_00);

        let later = now.checked_add(2.hours())?;

        assert_eq!(ctx.pricing.unit_price(variant, later).await?, 50_00);

        Ok(())
    }

    #[tokio::test]
    async fn unit_price_deal_window_end_is_exclusive() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = helpers::stocked_variant(&ctx, 100_00, 0, 10).await?;
        let ends_at = Timestamp::now();
        let starts_at = ends_at.checked_sub(1.hour())?;

        helpers::insert_deal(&ctx, variant, 2_500, Some(starts_at), Some(ends_at)).await?;

        assert_eq!(ctx.pricing.unit_price(variant, starts_at).await?, 75_00);
        assert_eq!(ctx.pricing.unit_price(variant, ends_at).await?, 100_00);

        Ok(())
    }

    #[tokio::test]
    async fn unit_price_unknown_variant_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .pricing
            .unit_price(VariantUuid::new(), Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(PricingServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn unit_price_rejects_discount_out_of_range() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = helpers::stocked_variant(&ctx, 100_00, 0, 10).await?;

        helpers::insert_deal(&ctx, variant, 12_000, None, None).await?;

        let result = ctx.pricing.unit_price(variant, Timestamp::now()).await;

        assert!(
            matches!(result, Err(PricingServiceError::InvalidPrice(_))),
            "expected InvalidPrice, got {result:?}"
        );
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Internal));

        Ok(())
    }

    #[tokio::test]
    async fn get_variant_pricing_returns_snapshot_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let product = helpers::insert_product(&ctx, "Basmati Rice", 250_00).await?;
        let variant = helpers::insert_variant(&ctx, product, "RICE-5KG", 30_00).await?;

        let pricing = ctx
            .pricing
            .get_variant_pricing(variant, Timestamp::now())
            .await?;

        assert_eq!(pricing.product_uuid, product);
        assert_eq!(pricing.product_name, "Basmati Rice");
        assert_eq!(pricing.sku, "RICE-5KG");
        assert!(pricing.is_active);
        assert_eq!(pricing.discount_basis_points, None);

        Ok(())
    }
}
