//! App Context

use std::{sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        addresses::{AddressesService, PgAddressesService},
        carts::{CartsService, PgCartsService},
        delivery::{DeliveryService, PgDeliveryService},
        inventory::{InventoryService, PgInventoryService},
        orders::{OrdersService, PgOrdersService},
        payments::{PaymentsService, PgPaymentsService},
        pricing::{PgPricingService, PricingService},
        tracking::{PgTrackingService, TrackingService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Runtime settings for the service graph.
#[derive(Debug, Clone, Copy)]
pub struct AppSettings {
    pub lock_timeout: Duration,

    /// Cart summary tax rate, in basis points.
    pub tax_rate_basis_points: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            lock_timeout: database::DEFAULT_LOCK_TIMEOUT,
            tax_rate_basis_points: 0,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub addresses: Arc<dyn AddressesService>,
    pub carts: Arc<dyn CartsService>,
    pub delivery: Arc<dyn DeliveryService>,
    pub inventory: Arc<dyn InventoryService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
    pub pricing: Arc<dyn PricingService>,
    pub tracking: Arc<dyn TrackingService>,
}

impl AppContext {
    /// Wire every service against one database handle.
    #[must_use]
    pub fn new(db: &Db, settings: AppSettings) -> Self {
        Self {
            addresses: Arc::new(PgAddressesService::new(db.clone())),
            carts: Arc::new(
                PgCartsService::new(db.clone()).with_tax_rate(settings.tax_rate_basis_points),
            ),
            delivery: Arc::new(PgDeliveryService::new(db.clone())),
            inventory: Arc::new(PgInventoryService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone())),
            payments: Arc::new(PgPaymentsService::new(db.clone())),
            pricing: Arc::new(PgPricingService::new(db.clone())),
            tracking: Arc::new(PgTrackingService::new(db.clone())),
        }
    }

    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool).with_lock_timeout(settings.lock_timeout);

        Ok(Self::new(&db, settings))
    }
}
