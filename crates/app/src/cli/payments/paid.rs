use clap::Args;
use serde_json::Value;
use storefront_app::{context::AppContext, domain::payments::PaymentUuid};
use uuid::Uuid;

use crate::cli::failed;

use super::print_payment;

#[derive(Debug, Args)]
pub(crate) struct MarkPaidArgs {
    /// Payment UUID
    #[arg(long)]
    payment_uuid: Uuid,

    /// Gateway transaction reference
    #[arg(long)]
    transaction_id: Option<String>,

    /// Raw gateway response, as JSON
    #[arg(long)]
    gateway_response: Option<String>,
}

pub(crate) async fn run(args: MarkPaidArgs, ctx: &AppContext) -> Result<(), String> {
    let gateway_response = args
        .gateway_response
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(failed("parse gateway response"))?;

    let payment = ctx
        .payments
        .mark_paid(
            PaymentUuid::from_uuid(args.payment_uuid),
            args.transaction_id,
            gateway_response,
        )
        .await
        .map_err(failed("mark payment paid"))?;

    print_payment(&payment);

    Ok(())
}
