use clap::Args;
use storefront::status::OrderStatus;
use storefront_app::{context::AppContext, domain::orders::records::OrderUuid};
use uuid::Uuid;

use crate::cli::failed;

use super::print_tracking;

#[derive(Debug, Args)]
pub(crate) struct AdvanceOrderArgs {
    /// Order UUID
    #[arg(long)]
    order_uuid: Uuid,

    /// Target status, e.g. `confirmed` or `out_for_delivery`
    #[arg(long)]
    status: OrderStatus,

    /// Note stored in the tracking log
    #[arg(long)]
    note: Option<String>,
}

pub(crate) async fn run(args: AdvanceOrderArgs, ctx: &AppContext) -> Result<(), String> {
    let tracking = ctx
        .tracking
        .update_status(OrderUuid::from_uuid(args.order_uuid), args.status, args.note)
        .await
        .map_err(failed("update order status"))?;

    print_tracking(&tracking);

    Ok(())
}
