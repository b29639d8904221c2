//! Inventory Repository

use sqlx::{Postgres, Transaction, query_scalar};

use crate::domain::pricing::records::VariantUuid;

const GET_AVAILABLE_SQL: &str = include_str!("sql/get_available.sql");
const LOCK_AVAILABLE_SQL: &str = include_str!("sql/lock_available.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInventoryRepository;

impl PgInventoryRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Available stock, or `None` when the variant does not exist.
    pub(crate) async fn find_available(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
    ) -> Result<Option<u32>, sqlx::Error> {
        let quantity: Option<i32> = query_scalar(GET_AVAILABLE_SQL)
            .bind(variant.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        quantity.map(stock_from_i32).transpose()
    }

    /// Locks the variant's inventory row for the rest of the transaction.
    ///
    /// A variant without an inventory row has no stock.
    pub(crate) async fn lock_available(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
    ) -> Result<u32, sqlx::Error> {
        let quantity: Option<i32> = query_scalar(LOCK_AVAILABLE_SQL)
            .bind(variant.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        quantity.map_or(Ok(0), stock_from_i32)
    }
}

fn stock_from_i32(quantity: i32) -> Result<u32, sqlx::Error> {
    u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
        index: "quantity".to_string(),
        source: Box::new(e),
    })
}
