//! Runtime configuration shared by every command.

use std::time::Duration;

use clap::{Args, ValueEnum};
use storefront_app::context::AppSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Args)]
pub(crate) struct Config {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub(crate) database_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub(crate) log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,

    /// How long a transaction waits for a row lock, in milliseconds
    #[arg(long, env = "LOCK_TIMEOUT_MS", default_value_t = 5_000)]
    pub(crate) lock_timeout_ms: u64,

    /// Tax applied to cart summaries, in basis points
    #[arg(long, env = "TAX_RATE_BASIS_POINTS", default_value_t = 0)]
    pub(crate) tax_rate_basis_points: u32,
}

impl Config {
    pub(crate) fn settings(&self) -> AppSettings {
        AppSettings {
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
            tax_rate_basis_points: self.tax_rate_basis_points,
        }
    }
}
