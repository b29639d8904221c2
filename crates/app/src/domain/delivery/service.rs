//! Delivery eligibility service.

use async_trait::async_trait;
use mockall::automock;
use storefront::delivery::Pincode;
use tracing::info;

use crate::{
    database::Db,
    domain::delivery::{
        errors::DeliveryServiceError, models::DeliveryCheck, records::DeliveryLocation,
        repository::PgDeliveryRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgDeliveryService {
    db: Db,
    repository: PgDeliveryRepository,
}

impl PgDeliveryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgDeliveryRepository::new(),
        }
    }
}

#[async_trait]
impl DeliveryService for PgDeliveryService {
    #[tracing::instrument(
        name = "delivery.service.check",
        skip(self),
        fields(available = tracing::field::Empty),
        err
    )]
    async fn check(&self, pincode: &str) -> Result<DeliveryCheck, DeliveryServiceError> {
        let pincode = Pincode::parse(pincode)?;

        let mut tx = self.db.begin_transaction().await?;

        let location = self
            .repository
            .find_available_location(&mut tx, &pincode)
            .await?;

        tx.commit().await?;

        tracing::Span::current().record("available", location.is_some());

        let free_delivery_text = location
            .as_ref()
            .map(|location| location.fee_schedule().map(|fees| fees.free_delivery_text()))
            .transpose()?;

        info!(%pincode, available = location.is_some(), "checked delivery");

        Ok(DeliveryCheck {
            pincode,
            location,
            free_delivery_text,
        })
    }

    async fn resolve(&self, pincode: &str) -> Result<DeliveryLocation, DeliveryServiceError> {
        let pincode = Pincode::parse(pincode)?;

        let mut tx = self.db.begin_transaction().await?;

        let location = self
            .repository
            .find_available_location(&mut tx, &pincode)
            .await?
            .ok_or(DeliveryServiceError::Unavailable)?;

        tx.commit().await?;

        Ok(location)
    }

    fn quote_fee(
        &self,
        location: &DeliveryLocation,
        subtotal: u64,
    ) -> Result<u64, DeliveryServiceError> {
        Ok(location.quote_fee(subtotal)?)
    }
}

#[automock]
#[async_trait]
pub trait DeliveryService: Send + Sync {
    /// Reports whether a pincode is serviceable, with the location details when it is.
    async fn check(&self, pincode: &str) -> Result<DeliveryCheck, DeliveryServiceError>;

    /// Resolves a pincode to its serviceable location.
    async fn resolve(&self, pincode: &str) -> Result<DeliveryLocation, DeliveryServiceError>;

    /// Delivery fee for a subtotal at a location.
    fn quote_fee(
        &self,
        location: &DeliveryLocation,
        subtotal: u64,
    ) -> Result<u64, DeliveryServiceError>;
}

#[cfg(test)]
mod tests {
    use storefront::delivery::PincodeError;
    use testresult::TestResult;

    use crate::{
        domain::errors::ErrorKind,
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    async fn check_available_pincode_returns_location() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::insert_location(&ctx, "175001", 50_00, 200_00, true).await?;

        let check = ctx.delivery.check(" 175001 ").await?;

        assert!(check.is_available());
        assert_eq!(check.pincode.as_str(), "175001");

        let location = check.location.ok_or("location should be present")?;

        assert_eq!(location.delivery_fee, 50_00);
        assert_eq!(location.minimum_order, 200_00);
        assert!(
            check
                .free_delivery_text
                .is_some_and(|text| text.starts_with("Free delivery on orders above"))
        );

        Ok(())
    }

    #[tokio::test]
    async fn check_unknown_pincode_reports_unavailable() -> TestResult {
        let ctx = TestContext::new().await;

        let check = ctx.delivery.check("560001").await?;

        assert!(!check.is_available());
        assert!(check.free_delivery_text.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn check_disabled_location_reports_unavailable() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::insert_location(&ctx, "175002", 50_00, 200_00, false).await?;

        assert!(!ctx.delivery.check("175002").await?.is_available());

        Ok(())
    }

    #[tokio::test]
    async fn check_rejects_malformed_pincode() {
        let ctx = TestContext::new().await;

        let result = ctx.delivery.check("17500A").await;

        assert!(
            matches!(
                result,
                Err(DeliveryServiceError::InvalidPincode(PincodeError::InvalidFormat))
            ),
            "expected InvalidPincode, got {result:?}"
        );
        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(ErrorKind::InvalidArgument)
        );
    }

    #[tokio::test]
    async fn resolve_unserviceable_pincode_returns_unavailable() {
        let ctx = TestContext::new().await;

        let result = ctx.delivery.resolve("110001").await;

        assert!(
            matches!(result, Err(DeliveryServiceError::Unavailable)),
            "expected Unavailable, got {result:?}"
        );
    }

    #[tokio::test]
    async fn quote_fee_applies_free_shipping_threshold() -> TestResult {
        let ctx = TestContext::new().await;

        helpers::insert_location(&ctx, "175001", 50_00, 200_00, true).await?;

        let location = ctx.delivery.resolve("175001").await?;

        assert_eq!(ctx.delivery.quote_fee(&location, 250_00)?, 0);
        assert_eq!(ctx.delivery.quote_fee(&location, 100_00)?, 50_00);

        Ok(())
    }
}
