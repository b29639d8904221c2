use clap::Args;
use storefront_app::{context::AppContext, domain::orders::records::OrderUuid};
use uuid::Uuid;

use crate::cli::{amount, failed};

use super::print_tracking;

#[derive(Debug, Args)]
pub(crate) struct ShowOrderArgs {
    /// Order UUID
    #[arg(long)]
    order_uuid: Uuid,
}

pub(crate) async fn run(args: ShowOrderArgs, ctx: &AppContext) -> Result<(), String> {
    let order_uuid = OrderUuid::from_uuid(args.order_uuid);

    let order = ctx
        .orders
        .lookup_order(order_uuid)
        .await
        .map_err(failed("load order"))?;

    let record = &order.record;

    println!("order_number: {}", record.order_number);
    println!("customer: {}", record.user_uuid);
    println!("pincode: {}", record.delivery_pincode);
    println!("payment_status: {}", record.payment_status);

    if let Some(notes) = &record.delivery_notes {
        println!("delivery_notes: {notes}");
    }

    for line in &order.lines {
        println!(
            "  {} x {} ({}) @ {} = {}",
            line.quantity,
            line.product_name,
            line.sku,
            amount(line.unit_price),
            amount(line.line_total)
        );
    }

    println!("items_subtotal: {}", amount(record.items_subtotal));
    println!("delivery_fee: {}", amount(record.delivery_fee));
    println!("total: {}", amount(record.total));

    let tracking = ctx
        .tracking
        .get_tracking(order_uuid)
        .await
        .map_err(failed("load tracking"))?;

    print_tracking(&tracking);

    Ok(())
}
