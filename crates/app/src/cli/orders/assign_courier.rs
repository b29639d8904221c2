use clap::Args;
use storefront_app::{context::AppContext, domain::orders::records::OrderUuid};
use uuid::Uuid;

use crate::cli::failed;

#[derive(Debug, Args)]
pub(crate) struct AssignCourierArgs {
    /// Order UUID
    #[arg(long)]
    order_uuid: Uuid,

    /// Courier name
    #[arg(long)]
    name: String,

    /// Courier phone number
    #[arg(long)]
    phone: String,
}

pub(crate) async fn run(args: AssignCourierArgs, ctx: &AppContext) -> Result<(), String> {
    let record = ctx
        .tracking
        .assign_courier(
            OrderUuid::from_uuid(args.order_uuid),
            &args.name,
            &args.phone,
        )
        .await
        .map_err(failed("assign courier"))?;

    println!("tracking_uuid: {}", record.uuid);
    println!(
        "courier: {} ({})",
        record.courier_name.unwrap_or_default(),
        record.courier_phone.unwrap_or_default()
    );

    Ok(())
}
