use clap::Args;
use storefront::status::OrderStatus;
use storefront_app::{context::AppContext, domain::orders::records::OrderUuid};
use uuid::Uuid;

use crate::cli::failed;

use super::print_tracking;

const DEFAULT_REASON: &str = "Order cancelled by store";

#[derive(Debug, Args)]
pub(crate) struct CancelOrderArgs {
    /// Order UUID
    #[arg(long)]
    order_uuid: Uuid,

    /// Reason stored in the tracking log
    #[arg(long)]
    reason: Option<String>,
}

pub(crate) async fn run(args: CancelOrderArgs, ctx: &AppContext) -> Result<(), String> {
    let reason = args.reason.unwrap_or_else(|| DEFAULT_REASON.to_string());

    let tracking = ctx
        .tracking
        .update_status(
            OrderUuid::from_uuid(args.order_uuid),
            OrderStatus::Cancelled,
            Some(reason),
        )
        .await
        .map_err(failed("cancel order"))?;

    print_tracking(&tracking);

    Ok(())
}
