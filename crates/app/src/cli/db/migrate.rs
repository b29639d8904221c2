use storefront_app::database;
use tracing::info;

use crate::{cli::failed, config::Config};

pub(crate) async fn run(config: &Config) -> Result<(), String> {
    let pool = database::connect(&config.database_url)
        .await
        .map_err(failed("connect to database"))?;

    database::migrate(&pool)
        .await
        .map_err(failed("apply migrations"))?;

    info!("migrations applied");
    println!("migrations applied");

    Ok(())
}
