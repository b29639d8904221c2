use clap::{Args, Subcommand};
use storefront_app::{context::AppContext, domain::tracking::Tracking};

mod advance;
mod assign_courier;
mod cancel;
mod show;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Print an order with its lines and tracking log
    Show(show::ShowOrderArgs),
    /// Move an order to a later fulfilment status
    Advance(advance::AdvanceOrderArgs),
    /// Cancel an order that has not been prepared yet
    Cancel(cancel::CancelOrderArgs),
    /// Record the courier handling a delivery
    AssignCourier(assign_courier::AssignCourierArgs),
}

pub(crate) async fn run(command: OrdersCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::Show(args) => show::run(args, ctx).await,
        OrdersSubcommand::Advance(args) => advance::run(args, ctx).await,
        OrdersSubcommand::Cancel(args) => cancel::run(args, ctx).await,
        OrdersSubcommand::AssignCourier(args) => assign_courier::run(args, ctx).await,
    }
}

fn print_tracking(tracking: &Tracking) {
    let record = &tracking.record;

    println!("status: {}", record.current_status.display_name());

    if let Some(estimate) = record.estimated_delivery {
        println!("estimated_delivery: {estimate}");
    }

    if let (Some(name), Some(phone)) = (&record.courier_name, &record.courier_phone) {
        println!("courier: {name} ({phone})");
    }

    for note in &tracking.notes {
        println!(
            "  {} {}{}",
            note.created_at,
            note.status,
            note.note
                .as_deref()
                .map_or_else(String::new, |text| format!(": {text}"))
        );
    }
}
