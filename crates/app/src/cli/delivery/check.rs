use clap::Args;
use storefront_app::context::AppContext;

use crate::cli::{amount, failed};

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    /// Six digit pincode
    pincode: String,
}

pub(crate) async fn run(args: CheckArgs, ctx: &AppContext) -> Result<(), String> {
    let check = ctx
        .delivery
        .check(&args.pincode)
        .await
        .map_err(failed("check pincode"))?;

    println!("{}", check.message());

    if let Some(location) = &check.location {
        println!("state: {}", location.state);
        println!("delivery_fee: {}", amount(location.delivery_fee));
        println!("free_delivery_from: {}", amount(location.minimum_order));
        println!("estimated_hours: {}", location.estimated_delivery_hours);
    }

    if let Some(text) = &check.free_delivery_text {
        println!("{text}");
    }

    Ok(())
}
