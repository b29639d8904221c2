use clap::Args;
use storefront_app::{context::AppContext, domain::payments::PaymentUuid};
use uuid::Uuid;

use crate::cli::failed;

use super::print_payment;

#[derive(Debug, Args)]
pub(crate) struct MarkFailedArgs {
    /// Payment UUID
    #[arg(long)]
    payment_uuid: Uuid,

    /// Why the payment failed
    #[arg(long)]
    reason: String,
}

pub(crate) async fn run(args: MarkFailedArgs, ctx: &AppContext) -> Result<(), String> {
    let payment = ctx
        .payments
        .mark_failed(PaymentUuid::from_uuid(args.payment_uuid), args.reason)
        .await
        .map_err(failed("mark payment failed"))?;

    print_payment(&payment);

    Ok(())
}
