use clap::{Args, Subcommand};
use storefront_app::{context::AppContext, domain::payments::PaymentRecord};

use crate::cli::amount;

mod failed;
mod list;
mod paid;
mod record;
mod refund;

#[derive(Debug, Args)]
pub(crate) struct PaymentsCommand {
    #[command(subcommand)]
    command: PaymentsSubcommand,
}

#[derive(Debug, Subcommand)]
enum PaymentsSubcommand {
    /// Open a pending payment against an order
    Record(record::RecordPaymentArgs),
    /// Mark a pending payment as settled
    Paid(paid::MarkPaidArgs),
    /// Mark a pending payment as failed
    Failed(failed::MarkFailedArgs),
    /// Refund a settled payment
    Refund(refund::RefundArgs),
    /// List the payments of an order
    List(list::ListPaymentsArgs),
}

pub(crate) async fn run(command: PaymentsCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        PaymentsSubcommand::Record(args) => record::run(args, ctx).await,
        PaymentsSubcommand::Paid(args) => paid::run(args, ctx).await,
        PaymentsSubcommand::Failed(args) => failed::run(args, ctx).await,
        PaymentsSubcommand::Refund(args) => refund::run(args, ctx).await,
        PaymentsSubcommand::List(args) => list::run(args, ctx).await,
    }
}

fn print_payment(payment: &PaymentRecord) {
    println!("payment_uuid: {}", payment.uuid);
    println!("payment_id: {}", payment.payment_id);
    println!("order_uuid: {}", payment.order_uuid);
    println!("amount: {}", amount(payment.amount));
    println!("method: {}", payment.method);
    println!("status: {}", payment.status);

    if let Some(transaction_id) = &payment.transaction_id {
        println!("transaction_id: {transaction_id}");
    }

    if let Some(reason) = &payment.failure_reason {
        println!("failure_reason: {reason}");
    }

    if let Some(reason) = &payment.refund_reason {
        println!("refund_reason: {reason}");
    }

    println!("initiated_at: {}", payment.initiated_at);
    println!(
        "completed_at: {}",
        payment
            .completed_at
            .map_or_else(|| "pending".to_string(), |value| value.to_string())
    );
}
