use std::error::Error;

use clap::{Parser, Subcommand};
use storefront_app::{context::AppContext, domain::errors::report, money};
use tracing::error;

use crate::config::Config;

mod db;
mod delivery;
mod orders;
mod payments;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Delivery(delivery::DeliveryCommand),
    Orders(orders::OrdersCommand),
    Payments(payments::PaymentsCommand),
}

impl Cli {
    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command, &self.config).await,
            Commands::Delivery(command) => {
                delivery::run(command, &connect(&self.config).await?).await
            }
            Commands::Orders(command) => orders::run(command, &connect(&self.config).await?).await,
            Commands::Payments(command) => {
                payments::run(command, &connect(&self.config).await?).await
            }
        }
    }
}

async fn connect(config: &Config) -> Result<AppContext, String> {
    AppContext::from_database_url(&config.database_url, config.settings())
        .await
        .map_err(failed("connect to database"))
}

/// Logs a failed action with its full source chain and returns the message
/// shown to the operator.
pub(crate) fn failed<E: Error>(action: &'static str) -> impl FnOnce(E) -> String {
    move |error| {
        error!("failed to {action}: {}", report(&error));

        format!("failed to {action}: {error}")
    }
}

/// Paise rendered as rupees, falling back to the raw figure.
pub(crate) fn amount(minor: u64) -> String {
    money::to_money(minor).map_or_else(|_| format!("{minor} paise"), |money| money.to_string())
}

#[cfg(test)]
mod tests {
    use storefront_app::domain::carts::CartsServiceError;

    use super::*;

    #[test]
    fn failed_keeps_operator_message_generic() {
        let message = failed("add line")(CartsServiceError::Sql(sqlx::Error::PoolTimedOut));

        assert_eq!(message, "failed to add line: storage error");
    }
}
