use clap::Args;
use storefront_app::{context::AppContext, domain::orders::records::OrderUuid};
use uuid::Uuid;

use crate::cli::failed;

use super::print_payment;

#[derive(Debug, Args)]
pub(crate) struct ListPaymentsArgs {
    /// Order UUID
    #[arg(long)]
    order_uuid: Uuid,
}

pub(crate) async fn run(args: ListPaymentsArgs, ctx: &AppContext) -> Result<(), String> {
    let payments = ctx
        .payments
        .list_payments(OrderUuid::from_uuid(args.order_uuid))
        .await
        .map_err(failed("list payments"))?;

    if payments.is_empty() {
        println!("no payments recorded for order {}", args.order_uuid);
        return Ok(());
    }

    for payment in payments {
        print_payment(&payment);
        println!();
    }

    Ok(())
}
