//! End-to-end checkout arithmetic: deal pricing, line totals, delivery fees and tax.

use rusty_money::{Money, iso::INR};
use testresult::TestResult;

use storefront::{
    checkout::{CartTotals, OrderTotals},
    delivery::{FeeSchedule, Pincode},
    inventory::{self, Availability},
    pricing::{VariantPrice, line_total, percentage_from_basis_points, sum_totals, unit_price},
    status::{OrderStatus, PaymentStatus},
};

fn schedule() -> FeeSchedule<'static> {
    FeeSchedule {
        delivery_fee: Money::from_minor(50_00, INR),
        minimum_order: Money::from_minor(200_00, INR),
    }
}

#[test]
fn discounted_basket_below_threshold_pays_delivery() -> TestResult {
    let rice = unit_price(&VariantPrice {
        base_price: Money::from_minor(100_00, INR),
        surcharge: Money::from_minor(20_00, INR),
        discount: Some(percentage_from_basis_points(1_000)?),
    })?;

    let ghee = unit_price(&VariantPrice {
        base_price: Money::from_minor(15_50, INR),
        surcharge: Money::from_minor(0, INR),
        discount: None,
    })?;

    assert_eq!(rice.to_minor_units(), 108_00);

    let subtotal = sum_totals(INR, [line_total(rice, 1)?, line_total(ghee, 2)?])?;
    let totals = OrderTotals::compute(subtotal, &schedule())?;

    assert_eq!(totals.items_subtotal.to_minor_units(), 139_00);
    assert_eq!(totals.delivery_fee.to_minor_units(), 50_00);
    assert_eq!(totals.total.to_minor_units(), 189_00);

    Ok(())
}

#[test]
fn cart_summary_at_threshold_ships_free_and_adds_tax() -> TestResult {
    let subtotal = Money::from_minor(250_00, INR);
    let totals = CartTotals::compute(subtotal, &percentage_from_basis_points(500)?, &schedule())?;

    assert!(totals.is_free_shipping);
    assert_eq!(totals.tax_amount.to_minor_units(), 12_50);
    assert_eq!(totals.total.to_minor_units(), 262_50);

    Ok(())
}

#[test]
fn stock_checks_gate_quantities() {
    assert!(inventory::can_satisfy(5, 5));
    assert!(!inventory::can_satisfy(5, 6));
    assert_eq!(Availability::of(0, 1), Availability::OutOfStock);
}

#[test]
fn pincode_normalises_before_lookup() -> TestResult {
    assert_eq!(Pincode::parse(" 175001 ")?.as_str(), "175001");
    assert!(Pincode::parse("17500A").is_err());

    Ok(())
}

#[test]
fn fulfilment_and_payment_move_forward_only() {
    assert!(OrderStatus::Placed.can_transition_to(OrderStatus::Preparing));
    assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
    assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Placed));

    let status = PaymentStatus::Pending
        .settle(PaymentStatus::Failed)
        .settle(PaymentStatus::Paid)
        .settle(PaymentStatus::Failed);

    assert_eq!(status, PaymentStatus::Paid);
    assert_eq!(status.settle(PaymentStatus::Refunded), PaymentStatus::Refunded);
}
