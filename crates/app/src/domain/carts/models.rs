//! Cart Models

use jiff::Timestamp;
use storefront::inventory::Availability;

use crate::{
    domain::{
        carts::{
            records::{CartLineUuid, CartRecord, CartUuid, PricedCartLine},
            token::CartToken,
        },
        customers::UserUuid,
        delivery::records::DeliveryLocation,
        pricing::records::{ProductUuid, VariantUuid},
    },
    money::{self, AmountError},
};

/// Who a cart belongs to.
#[derive(Debug, Clone)]
pub enum CartOwner {
    User(UserUuid),
    Anonymous(CartToken),
}

/// A cart priced at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub uuid: CartUuid,
    pub user_uuid: Option<UserUuid>,
    pub lines: Vec<CartLine>,

    /// Sum of line quantities.
    pub total_items: u64,

    /// Sum of line totals, in minor units.
    pub total_amount: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cart {
    pub(crate) fn from_priced(
        record: CartRecord,
        priced: Vec<PricedCartLine>,
    ) -> Result<Self, AmountError> {
        let lines = priced
            .into_iter()
            .map(CartLine::from_priced)
            .collect::<Result<Vec<_>, _>>()?;

        let total_items = lines.iter().map(|line| u64::from(line.quantity)).sum();
        let total_amount = money::sum(lines.iter().map(|line| line.line_total))?;

        Ok(Self {
            uuid: record.uuid,
            user_uuid: record.user_uuid,
            lines,
            total_items,
            total_amount,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn line(&self, uuid: CartLineUuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.uuid == uuid)
    }

    #[must_use]
    pub fn line_for_variant(&self, variant: VariantUuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.variant_uuid == variant)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub uuid: CartLineUuid,
    pub variant_uuid: VariantUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
    pub availability: Availability,
}

impl CartLine {
    fn from_priced(priced: PricedCartLine) -> Result<Self, AmountError> {
        let unit_price = priced.pricing.unit_price()?;
        let line_total = money::line_total(unit_price, priced.line.quantity)?;

        Ok(Self {
            uuid: priced.line.uuid,
            variant_uuid: priced.line.variant_uuid,
            product_uuid: priced.pricing.product_uuid,
            product_name: priced.pricing.product_name,
            sku: priced.pricing.sku,
            quantity: priced.line.quantity,
            unit_price,
            line_total,
            availability: Availability::of(priced.available, priced.line.quantity),
        })
    }
}

/// Result of a line mutation along with the refreshed cart.
#[derive(Debug, Clone)]
pub struct LineUpdate {
    pub line_uuid: CartLineUuid,

    /// The line was deleted because its quantity reached zero.
    pub removed: bool,
    pub cart: Cart,
}

impl LineUpdate {
    /// The updated line, absent when it was removed.
    #[must_use]
    pub fn line(&self) -> Option<&CartLine> {
        self.cart.line(self.line_uuid)
    }
}

/// A freshly minted anonymous cart. The token is only ever returned here.
#[derive(Debug, Clone)]
pub struct AnonymousCart {
    pub token: CartToken,
    pub cart: Cart,
}

/// Checkout preview for a cart delivered to a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub total_items: u64,
    pub subtotal: u64,
    pub tax_rate_basis_points: u32,
    pub tax_amount: u64,
    pub shipping: u64,
    pub total: u64,
    pub free_shipping_threshold: u64,
    pub is_free_shipping: bool,
    pub location: DeliveryLocation,
}
