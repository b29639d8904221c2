use clap::Args;
use storefront_app::{context::AppContext, domain::payments::PaymentUuid};
use uuid::Uuid;

use crate::cli::failed;

use super::print_payment;

#[derive(Debug, Args)]
pub(crate) struct RefundArgs {
    /// Payment UUID
    #[arg(long)]
    payment_uuid: Uuid,

    /// Why the payment was refunded
    #[arg(long)]
    reason: Option<String>,
}

pub(crate) async fn run(args: RefundArgs, ctx: &AppContext) -> Result<(), String> {
    let payment = ctx
        .payments
        .mark_refunded(PaymentUuid::from_uuid(args.payment_uuid), args.reason)
        .await
        .map_err(failed("refund payment"))?;

    print_payment(&payment);

    Ok(())
}
