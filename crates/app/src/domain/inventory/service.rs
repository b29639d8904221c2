//! Inventory service.

use async_trait::async_trait;
use mockall::automock;
use storefront::inventory;

use crate::{
    database::Db,
    domain::{
        inventory::{errors::InventoryServiceError, repository::PgInventoryRepository},
        pricing::records::VariantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgInventoryService {
    db: Db,
    repository: PgInventoryRepository,
}

impl PgInventoryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgInventoryRepository::new(),
        }
    }
}

#[async_trait]
impl InventoryService for PgInventoryService {
    async fn available(&self, variant: VariantUuid) -> Result<u32, InventoryServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let available = self
            .repository
            .find_available(&mut tx, variant)
            .await?
            .ok_or(InventoryServiceError::NotFound)?;

        tx.commit().await?;

        Ok(available)
    }

    async fn can_satisfy(
        &self,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<bool, InventoryServiceError> {
        let available = self.available(variant).await?;

        Ok(inventory::can_satisfy(available, quantity))
    }
}

/// Read-only stock lookups.
///
/// Answers are advisory; writers re-read stock under a row lock in their own
/// transaction before committing.
#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Available stock for a variant. Variants without an inventory record have none.
    async fn available(&self, variant: VariantUuid) -> Result<u32, InventoryServiceError>;

    /// Whether `quantity` units are currently available.
    async fn can_satisfy(
        &self,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<bool, InventoryServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, helpers};

    use super::*;

    #[tokio::test]
    async fn available_returns_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 7).await?;

        assert_eq!(ctx.inventory.available(variant).await?, 7);

        Ok(())
    }

    #[tokio::test]
    async fn available_without_inventory_record_is_zero() -> TestResult {
        let ctx = TestContext::new().await;
        let product = helpers::insert_product(&ctx, "Ghee", 55_00).await?;
        let variant = helpers::insert_variant(&ctx, product, "GHEE-1L", 0).await?;

        assert_eq!(ctx.inventory.available(variant).await?, 0);
        assert!(!ctx.inventory.can_satisfy(variant, 1).await?);

        Ok(())
    }

    #[tokio::test]
    async fn available_unknown_variant_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.inventory.available(VariantUuid::new()).await;

        assert!(
            matches!(result, Err(InventoryServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn can_satisfy_compares_against_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 3).await?;

        assert!(ctx.inventory.can_satisfy(variant, 3).await?);
        assert!(!ctx.inventory.can_satisfy(variant, 4).await?);

        Ok(())
    }
}
