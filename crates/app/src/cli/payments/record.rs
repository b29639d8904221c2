use clap::Args;
use storefront::status::PaymentMethod;
use storefront_app::{context::AppContext, domain::orders::records::OrderUuid};
use uuid::Uuid;

use crate::cli::failed;

use super::print_payment;

#[derive(Debug, Args)]
pub(crate) struct RecordPaymentArgs {
    /// Order UUID
    #[arg(long)]
    order_uuid: Uuid,

    /// One of `cod`, `online`, `upi`, `card`, `wallet`
    #[arg(long)]
    method: PaymentMethod,

    /// Amount in paise; defaults to the order total
    #[arg(long)]
    amount: Option<u64>,
}

pub(crate) async fn run(args: RecordPaymentArgs, ctx: &AppContext) -> Result<(), String> {
    let order_uuid = OrderUuid::from_uuid(args.order_uuid);

    let amount = match args.amount {
        Some(amount) => amount,
        None => {
            ctx.orders
                .lookup_order(order_uuid)
                .await
                .map_err(failed("load order"))?
                .record
                .total
        }
    };

    let payment = ctx
        .payments
        .record_payment(order_uuid, args.method, amount)
        .await
        .map_err(failed("record payment"))?;

    print_payment(&payment);

    Ok(())
}
