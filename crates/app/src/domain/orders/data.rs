//! Order Data

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::domain::{
    addresses::records::AddressUuid,
    customers::UserUuid,
    orders::{
        errors::OrdersServiceError,
        records::{OrderLineUuid, OrderUuid},
    },
    pricing::records::{ProductUuid, VariantUuid},
};

/// Checkout request.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub address_uuid: AddressUuid,
    pub source: OrderSource,
    pub delivery_notes: Option<String>,
}

/// Where the lines of a new order come from.
#[derive(Debug, Clone)]
pub enum OrderSource {
    /// The customer's cart, emptied on success.
    Cart,

    /// An explicit list; repeated variants are combined.
    Items(SmallVec<[OrderItem; 4]>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderItem {
    pub variant_uuid: VariantUuid,
    pub quantity: u32,
}

/// Combine repeated variants and sort by variant uuid, which is also the
/// order inventory rows get locked in.
pub(crate) fn coalesce_items<I>(items: I) -> Result<Vec<OrderItem>, OrdersServiceError>
where
    I: IntoIterator<Item = OrderItem>,
{
    let mut quantities: FxHashMap<VariantUuid, u32> = FxHashMap::default();

    for item in items {
        if item.quantity == 0 {
            return Err(OrdersServiceError::InvalidQuantity);
        }

        let quantity = quantities.entry(item.variant_uuid).or_default();

        *quantity = quantity
            .checked_add(item.quantity)
            .ok_or(OrdersServiceError::InvalidQuantity)?;
    }

    let mut coalesced: Vec<OrderItem> = quantities
        .into_iter()
        .map(|(variant_uuid, quantity)| OrderItem {
            variant_uuid,
            quantity,
        })
        .collect();

    coalesced.sort_by_key(|item| item.variant_uuid);

    Ok(coalesced)
}

/// Identity and delivery details of an order before its lines exist.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OrderShell<'a> {
    pub uuid: OrderUuid,
    pub order_number: &'a str,
    pub user_uuid: UserUuid,
    pub address_uuid: AddressUuid,
    pub delivery_pincode: &'a str,
    pub delivery_notes: Option<&'a str>,
}

/// Snapshot of one line, written at placement.
#[derive(Debug, Clone)]
pub(crate) struct NewOrderLine {
    pub uuid: OrderLineUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub variant_uuid: VariantUuid,
    pub product_name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn coalesce_sums_repeated_variants_and_sorts() -> TestResult {
        let a = VariantUuid::new();
        let b = VariantUuid::new();

        let items: SmallVec<[OrderItem; 4]> = smallvec![
            OrderItem {
                variant_uuid: b,
                quantity: 1,
            },
            OrderItem {
                variant_uuid: a,
                quantity: 2,
            },
            OrderItem {
                variant_uuid: b,
                quantity: 4,
            },
        ];

        let coalesced = coalesce_items(items)?;

        assert_eq!(
            coalesced,
            vec![
                OrderItem {
                    variant_uuid: a,
                    quantity: 2,
                },
                OrderItem {
                    variant_uuid: b,
                    quantity: 5,
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn coalesce_rejects_zero_quantity() {
        let result = coalesce_items([OrderItem {
            variant_uuid: VariantUuid::new(),
            quantity: 0,
        }]);

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );
    }
}
