use clap::{Args, Subcommand};
use storefront_app::context::AppContext;

mod check;

#[derive(Debug, Args)]
pub(crate) struct DeliveryCommand {
    #[command(subcommand)]
    command: DeliverySubcommand,
}

#[derive(Debug, Subcommand)]
enum DeliverySubcommand {
    /// Check whether a pincode is serviceable
    Check(check::CheckArgs),
}

pub(crate) async fn run(command: DeliveryCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        DeliverySubcommand::Check(args) => check::run(args, ctx).await,
    }
}
