//! Carts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use storefront::{checkout::CartTotals, delivery::Pincode, inventory, pricing};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{AnonymousCart, Cart, CartOwner, CartSummary, LineUpdate},
            records::{CartLineRecord, CartLineUuid, CartRecord, CartUuid, OwnerKey},
            repositories::{PgCartLinesRepository, PgCartsRepository},
            token::CartToken,
        },
        customers::UserUuid,
        delivery::repository::PgDeliveryRepository,
        inventory::repository::PgInventoryRepository,
        pricing::{records::VariantUuid, repository::PgPricingRepository},
    },
    money::{self, to_minor},
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts: PgCartsRepository,
    lines: PgCartLinesRepository,
    pricing: PgPricingRepository,
    inventory: PgInventoryRepository,
    delivery: PgDeliveryRepository,
    tax_rate_basis_points: u32,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts: PgCartsRepository::new(),
            lines: PgCartLinesRepository::new(),
            pricing: PgPricingRepository::new(),
            inventory: PgInventoryRepository::new(),
            delivery: PgDeliveryRepository::new(),
            tax_rate_basis_points: 0,
        }
    }

    /// Tax charged on cart summaries, in basis points of the subtotal.
    #[must_use]
    pub fn with_tax_rate(mut self, basis_points: u32) -> Self {
        self.tax_rate_basis_points = basis_points;
        self
    }

    /// Locks the owner's cart, creating it first if needed.
    async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &OwnerKey,
    ) -> Result<CartRecord, CartsServiceError> {
        self.carts.ensure_cart(tx, CartUuid::new(), owner).await?;

        self.carts
            .lock_cart(tx, owner)
            .await?
            .ok_or_else(|| CartsServiceError::Sql(sqlx::Error::RowNotFound))
    }

    /// Locks the variant's stock row and checks it covers `quantity`.
    async fn reserve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<(), CartsServiceError> {
        let available = self.inventory.lock_available(tx, variant).await?;

        if !inventory::can_satisfy(available, quantity) {
            warn!(%variant, requested = quantity, available, "insufficient stock");

            return Err(CartsServiceError::InsufficientStock { available });
        }

        Ok(())
    }

    async fn find_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        line: CartLineUuid,
    ) -> Result<CartLineRecord, CartsServiceError> {
        self.lines
            .find_line(tx, cart, line)
            .await?
            .ok_or(CartsServiceError::LineNotFound)
    }

    async fn view(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartRecord,
    ) -> Result<Cart, CartsServiceError> {
        let priced = self
            .lines
            .list_priced_lines(tx, cart.uuid, Timestamp::now())
            .await?;

        Ok(Cart::from_priced(cart, priced)?)
    }

    /// Stamps the cart as modified and returns the fresh view.
    async fn touch_and_view(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Cart, CartsServiceError> {
        let cart = self.carts.touch_cart(tx, cart).await?;

        self.view(tx, cart).await
    }

    async fn write_quantity(
        &self,
        owner: &CartOwner,
        line: CartLineUuid,
        quantity: impl FnOnce(u32) -> Result<u32, CartsServiceError> + Send,
    ) -> Result<LineUpdate, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.lock_cart(&mut tx, &OwnerKey::from(owner)).await?;
        let current = self.find_line(&mut tx, cart.uuid, line).await?;
        let quantity = quantity(current.quantity)?;

        if quantity > current.quantity {
            self.reserve(&mut tx, current.variant_uuid, quantity).await?;
        }

        self.lines
            .update_quantity(&mut tx, cart.uuid, line, quantity)
            .await?;

        let cart = self.touch_and_view(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        Ok(LineUpdate {
            line_uuid: line,
            removed: false,
            cart,
        })
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.service.start_anonymous_cart",
        skip(self),
        fields(cart_uuid = tracing::field::Empty),
        err
    )]
    async fn start_anonymous_cart(&self) -> Result<AnonymousCart, CartsServiceError> {
        let token = CartToken::generate();

        let mut tx = self.db.begin_transaction().await?;

        let cart = self.lock_cart(&mut tx, &OwnerKey::from(&token)).await?;
        let cart = self.view(&mut tx, cart).await?;

        tx.commit().await?;

        tracing::Span::current().record("cart_uuid", tracing::field::display(cart.uuid));

        Ok(AnonymousCart { token, cart })
    }

    async fn get_or_create_cart(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.lock_cart(&mut tx, &OwnerKey::from(owner)).await?;
        let cart = self.view(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.add_line",
        skip(self, owner),
        fields(variant_uuid = %variant, quantity, cart_uuid = tracing::field::Empty),
        err
    )]
    async fn add_line(
        &self,
        owner: &CartOwner,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<LineUpdate, CartsServiceError> {
        if quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_transaction().await?;

        let cart = self.lock_cart(&mut tx, &OwnerKey::from(owner)).await?;

        tracing::Span::current().record("cart_uuid", tracing::field::display(cart.uuid));

        self.pricing
            .find_variant_pricing(&mut tx, variant, Timestamp::now())
            .await?
            .filter(|pricing| pricing.is_active)
            .ok_or(CartsServiceError::VariantNotFound)?;

        let existing = self
            .lines
            .find_line_for_variant(&mut tx, cart.uuid, variant)
            .await?
            .map_or(0, |line| line.quantity);

        let total = existing
            .checked_add(quantity)
            .ok_or(CartsServiceError::InvalidQuantity)?;

        self.reserve(&mut tx, variant, total).await?;

        let line = self
            .lines
            .upsert_line(&mut tx, cart.uuid, CartLineUuid::new(), variant, total)
            .await?;

        let cart = self.touch_and_view(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        info!(line_uuid = %line.uuid, quantity = total, "added to cart");

        Ok(LineUpdate {
            line_uuid: line.uuid,
            removed: false,
            cart,
        })
    }

    #[tracing::instrument(
        name = "carts.service.set_quantity",
        skip(self, owner),
        fields(line_uuid = %line, quantity),
        err
    )]
    async fn set_quantity(
        &self,
        owner: &CartOwner,
        line: CartLineUuid,
        quantity: u32,
    ) -> Result<LineUpdate, CartsServiceError> {
        if quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        self.write_quantity(owner, line, |_| Ok(quantity)).await
    }

    #[tracing::instrument(
        name = "carts.service.increment_line",
        skip(self, owner),
        fields(line_uuid = %line, amount),
        err
    )]
    async fn increment_line(
        &self,
        owner: &CartOwner,
        line: CartLineUuid,
        amount: u32,
    ) -> Result<LineUpdate, CartsServiceError> {
        if amount == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        self.write_quantity(owner, line, |current| {
            current
                .checked_add(amount)
                .ok_or(CartsServiceError::InvalidQuantity)
        })
        .await
    }

    #[tracing::instrument(
        name = "carts.service.decrement_line",
        skip(self, owner),
        fields(line_uuid = %line, amount),
        err
    )]
    async fn decrement_line(
        &self,
        owner: &CartOwner,
        line: CartLineUuid,
        amount: u32,
    ) -> Result<LineUpdate, CartsServiceError> {
        if amount == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_transaction().await?;

        let cart = self.lock_cart(&mut tx, &OwnerKey::from(owner)).await?;
        let current = self.find_line(&mut tx, cart.uuid, line).await?;
        let removed = amount >= current.quantity;

        if removed {
            self.lines.delete_line(&mut tx, cart.uuid, line).await?;
        } else {
            self.lines
                .update_quantity(&mut tx, cart.uuid, line, current.quantity - amount)
                .await?;
        }

        let cart = self.touch_and_view(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        Ok(LineUpdate {
            line_uuid: line,
            removed,
            cart,
        })
    }

    #[tracing::instrument(
        name = "carts.service.remove_line",
        skip(self, owner),
        fields(line_uuid = %line),
        err
    )]
    async fn remove_line(
        &self,
        owner: &CartOwner,
        line: CartLineUuid,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.lock_cart(&mut tx, &OwnerKey::from(owner)).await?;

        if self.lines.delete_line(&mut tx, cart.uuid, line).await? == 0 {
            return Err(CartsServiceError::LineNotFound);
        }

        let cart = self.touch_and_view(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn clear_cart(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.lock_cart(&mut tx, &OwnerKey::from(owner)).await?;

        let removed = self.lines.clear_lines(&mut tx, cart.uuid).await?;
        let cart = self.touch_and_view(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, removed, "cleared cart");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.merge_carts",
        skip(self, token),
        fields(user_uuid = %user),
        err
    )]
    async fn merge_carts(
        &self,
        token: &CartToken,
        user: UserUuid,
    ) -> Result<Cart, CartsServiceError> {
        let token_hash = token.hash();

        let mut tx = self.db.begin_transaction().await?;

        let locked = self
            .carts
            .lock_merge_pair(&mut tx, &token_hash, user)
            .await?;

        let (anonymous, owned): (Vec<_>, Vec<_>) =
            locked.into_iter().partition(CartRecord::is_anonymous);

        let cart = match (anonymous.into_iter().next(), owned.into_iter().next()) {
            (None, Some(target)) => target,
            (None, None) => self.lock_cart(&mut tx, &OwnerKey::User(user)).await?,
            (Some(source), None) => {
                info!(cart_uuid = %source.uuid, "re-owned anonymous cart");

                self.carts.reown_cart(&mut tx, source.uuid, user).await?
            }
            (Some(source), Some(target)) => {
                let merged = self
                    .lines
                    .merge_overlapping_lines(&mut tx, source.uuid, target.uuid)
                    .await?;
                let moved = self
                    .lines
                    .move_lines(&mut tx, source.uuid, target.uuid)
                    .await?;

                self.carts.delete_cart(&mut tx, source.uuid).await?;

                info!(
                    source_cart_uuid = %source.uuid,
                    target_cart_uuid = %target.uuid,
                    merged,
                    moved,
                    "merged anonymous cart"
                );

                self.carts.touch_cart(&mut tx, target.uuid).await?
            }
        };

        let cart = self.view(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.cart_summary",
        skip(self, owner),
        fields(cart_uuid = tracing::field::Empty),
        err
    )]
    async fn cart_summary(
        &self,
        owner: &CartOwner,
        pincode: &str,
    ) -> Result<CartSummary, CartsServiceError> {
        let pincode = Pincode::parse(pincode)?;
        let tax_rate = pricing::percentage_from_basis_points(self.tax_rate_basis_points)
            .map_err(money::AmountError::from)?;

        let mut tx = self.db.begin_transaction().await?;

        let location = self
            .delivery
            .find_available_location(&mut tx, &pincode)
            .await?
            .ok_or(CartsServiceError::DeliveryUnavailable)?;

        let cart = self.lock_cart(&mut tx, &OwnerKey::from(owner)).await?;
        let cart = self.view(&mut tx, cart).await?;

        tx.commit().await?;

        tracing::Span::current().record("cart_uuid", tracing::field::display(cart.uuid));

        let totals = CartTotals::compute(
            money::to_money(cart.total_amount)?,
            &tax_rate,
            &location.fee_schedule()?,
        )
        .map_err(money::AmountError::from)?;

        Ok(CartSummary {
            total_items: cart.total_items,
            subtotal: to_minor(&totals.subtotal)?,
            tax_rate_basis_points: self.tax_rate_basis_points,
            tax_amount: to_minor(&totals.tax_amount)?,
            shipping: to_minor(&totals.shipping)?,
            total: to_minor(&totals.total)?,
            free_shipping_threshold: location.minimum_order,
            is_free_shipping: totals.is_free_shipping,
            location,
        })
    }
}

/// Mutable pre-purchase baskets.
///
/// Every mutation runs in one transaction holding the cart row lock, plus the
/// inventory row of any variant whose quantity grows.
#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Mints an anonymous token and creates its cart.
    async fn start_anonymous_cart(&self) -> Result<AnonymousCart, CartsServiceError>;

    /// The owner's cart, created on first use.
    async fn get_or_create_cart(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError>;

    /// Adds `quantity` units of a variant, summing with an existing line.
    async fn add_line(
        &self,
        owner: &CartOwner,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<LineUpdate, CartsServiceError>;

    async fn set_quantity(
        &self,
        owner: &CartOwner,
        line: CartLineUuid,
        quantity: u32,
    ) -> Result<LineUpdate, CartsServiceError>;

    async fn increment_line(
        &self,
        owner: &CartOwner,
        line: CartLineUuid,
        amount: u32,
    ) -> Result<LineUpdate, CartsServiceError>;

    /// Lowers a line's quantity, deleting the line when it reaches zero.
    async fn decrement_line(
        &self,
        owner: &CartOwner,
        line: CartLineUuid,
        amount: u32,
    ) -> Result<LineUpdate, CartsServiceError>;

    async fn remove_line(
        &self,
        owner: &CartOwner,
        line: CartLineUuid,
    ) -> Result<Cart, CartsServiceError>;

    async fn clear_cart(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError>;

    /// Folds the anonymous cart into the user's cart. Overlapping variants sum
    /// without a stock check.
    async fn merge_carts(
        &self,
        token: &CartToken,
        user: UserUuid,
    ) -> Result<Cart, CartsServiceError>;

    /// Totals, tax and shipping for delivering the cart to `pincode`.
    async fn cart_summary(
        &self,
        owner: &CartOwner,
        pincode: &str,
    ) -> Result<CartSummary, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storefront::inventory::Availability;
    use testresult::TestResult;

    use crate::{
        domain::errors::ErrorKind,
        test::{TestContext, helpers},
    };

    use super::*;

    fn user() -> CartOwner {
        CartOwner::User(UserUuid::new())
    }

    #[tokio::test]
    async fn get_or_create_cart_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();

        let first = ctx.carts.get_or_create_cart(&owner).await?;
        let second = ctx.carts.get_or_create_cart(&owner).await?;

        assert_eq!(first.uuid, second.uuid);
        assert!(second.is_empty());
        assert_eq!(second.total_amount, 0);

        Ok(())
    }

    #[tokio::test]
    async fn anonymous_cart_is_found_again_by_token() -> TestResult {
        let ctx = TestContext::new().await;

        let started = ctx.carts.start_anonymous_cart().await?;
        let token = CartToken::parse(&started.token.reveal())?;

        let cart = ctx
            .carts
            .get_or_create_cart(&CartOwner::Anonymous(token))
            .await?;

        assert_eq!(cart.uuid, started.cart.uuid);
        assert_eq!(cart.user_uuid, None);

        Ok(())
    }

    #[tokio::test]
    async fn add_line_twice_sums_into_one_line() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();
        let variant = helpers::stocked_variant(&ctx, 100_00, 20_00, 10).await?;

        let first = ctx.carts.add_line(&owner, variant, 2).await?;
        let second = ctx.carts.add_line(&owner, variant, 3).await?;

        assert_eq!(first.line_uuid, second.line_uuid);
        assert_eq!(second.cart.lines.len(), 1);

        let line = second.line().ok_or("line should be present")?;

        assert_eq!(line.quantity, 5);
        assert_eq!(line.unit_price, 120_00);
        assert_eq!(line.line_total, 600_00);
        assert_eq!(second.cart.total_items, 5);
        assert_eq!(second.cart.total_amount, 600_00);

        Ok(())
    }

    #[tokio::test]
    async fn add_line_prices_with_active_deal() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();
        let variant = helpers::stocked_variant(&ctx, 100_00, 20_00, 10).await?;

        helpers::insert_deal(&ctx, variant, 1_000, None, None).await?;

        let update = ctx.carts.add_line(&owner, variant, 1).await?;

        assert_eq!(update.cart.total_amount, 108_00);

        Ok(())
    }

    #[tokio::test]
    async fn add_line_rejects_zero_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 10).await?;

        let result = ctx.carts.add_line(&user(), variant, 0).await;

        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(ErrorKind::InvalidArgument)
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_line_unknown_or_inactive_variant_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 10).await?;

        helpers::deactivate_variant(&ctx, variant).await?;

        let inactive = ctx.carts.add_line(&owner, variant, 1).await;
        let unknown = ctx.carts.add_line(&owner, VariantUuid::new(), 1).await;

        assert!(
            matches!(inactive, Err(CartsServiceError::VariantNotFound)),
            "expected VariantNotFound, got {inactive:?}"
        );
        assert!(
            matches!(unknown, Err(CartsServiceError::VariantNotFound)),
            "expected VariantNotFound, got {unknown:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_line_beyond_stock_leaves_cart_unchanged() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 3).await?;

        ctx.carts.add_line(&owner, variant, 2).await?;

        let result = ctx.carts.add_line(&owner, variant, 2).await;

        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(ErrorKind::InsufficientStock { available: 3 })
        );

        let cart = ctx.carts.get_or_create_cart(&owner).await?;

        assert_eq!(
            cart.line_for_variant(variant).map(|line| line.quantity),
            Some(2)
        );

        Ok(())
    }

    #[tokio::test]
    async fn set_quantity_revalidates_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 4).await?;

        let added = ctx.carts.add_line(&owner, variant, 1).await?;

        let updated = ctx.carts.set_quantity(&owner, added.line_uuid, 4).await?;

        assert_eq!(updated.line().map(|line| line.quantity), Some(4));
        assert_eq!(
            updated.line().map(|line| line.availability),
            Some(Availability::InStock)
        );

        let result = ctx.carts.set_quantity(&owner, added.line_uuid, 5).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::InsufficientStock { available: 4 })
            ),
            "expected InsufficientStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn increment_and_decrement_adjust_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 10).await?;

        let added = ctx.carts.add_line(&owner, variant, 2).await?;

        let incremented = ctx.carts.increment_line(&owner, added.line_uuid, 3).await?;

        assert_eq!(incremented.line().map(|line| line.quantity), Some(5));

        let decremented = ctx.carts.decrement_line(&owner, added.line_uuid, 1).await?;

        assert!(!decremented.removed);
        assert_eq!(decremented.line().map(|line| line.quantity), Some(4));

        Ok(())
    }

    #[tokio::test]
    async fn decrement_to_zero_removes_line() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 10).await?;

        let added = ctx.carts.add_line(&owner, variant, 2).await?;

        let update = ctx.carts.decrement_line(&owner, added.line_uuid, 5).await?;

        assert!(update.removed);
        assert!(update.line().is_none());
        assert!(ctx.carts.get_or_create_cart(&owner).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn remove_nonexistent_line_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.carts.remove_line(&user(), CartLineUuid::new()).await;

        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::NotFound));

        Ok(())
    }

    #[tokio::test]
    async fn remove_line_of_other_owner_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 10).await?;

        let added = ctx.carts.add_line(&owner, variant, 1).await?;

        let result = ctx.carts.remove_line(&user(), added.line_uuid).await;

        assert!(
            matches!(result, Err(CartsServiceError::LineNotFound)),
            "expected LineNotFound, got {result:?}"
        );
        assert!(!ctx.carts.get_or_create_cart(&owner).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn clear_cart_removes_every_line() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();

        for stock in [5, 6] {
            let variant = helpers::stocked_variant(&ctx, 10_00, 0, stock).await?;

            ctx.carts.add_line(&owner, variant, 1).await?;
        }

        let cart = ctx.carts.clear_cart(&owner).await?;

        assert!(cart.is_empty());
        assert_eq!(cart.total_items, 0);

        Ok(())
    }

    #[tokio::test]
    async fn merge_sums_overlapping_and_moves_the_rest() -> TestResult {
        let ctx = TestContext::new().await;
        let user_uuid = UserUuid::new();
        let owner = CartOwner::User(user_uuid);
        let shared = helpers::stocked_variant(&ctx, 10_00, 0, 10).await?;
        let only_anonymous = helpers::stocked_variant(&ctx, 20_00, 0, 10).await?;

        let started = ctx.carts.start_anonymous_cart().await?;
        let anonymous = CartOwner::Anonymous(started.token.clone());

        ctx.carts.add_line(&anonymous, shared, 2).await?;
        ctx.carts.add_line(&anonymous, only_anonymous, 1).await?;
        ctx.carts.add_line(&owner, shared, 3).await?;

        let merged = ctx.carts.merge_carts(&started.token, user_uuid).await?;

        assert_eq!(merged.user_uuid, Some(user_uuid));
        assert_eq!(
            merged.line_for_variant(shared).map(|line| line.quantity),
            Some(5)
        );
        assert_eq!(
            merged
                .line_for_variant(only_anonymous)
                .map(|line| line.quantity),
            Some(1)
        );

        let fresh = ctx.carts.get_or_create_cart(&anonymous).await?;

        assert_ne!(fresh.uuid, started.cart.uuid);
        assert!(fresh.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn merge_without_user_cart_reowns_anonymous_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user_uuid = UserUuid::new();
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 10).await?;

        let started = ctx.carts.start_anonymous_cart().await?;

        ctx.carts
            .add_line(&CartOwner::Anonymous(started.token.clone()), variant, 2)
            .await?;

        let merged = ctx.carts.merge_carts(&started.token, user_uuid).await?;

        assert_eq!(merged.uuid, started.cart.uuid);
        assert_eq!(merged.user_uuid, Some(user_uuid));
        assert_eq!(merged.total_items, 2);

        Ok(())
    }

    #[tokio::test]
    async fn merge_without_anonymous_cart_returns_user_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user_uuid = UserUuid::new();
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 10).await?;

        ctx.carts
            .add_line(&CartOwner::User(user_uuid), variant, 1)
            .await?;

        let merged = ctx
            .carts
            .merge_carts(&CartToken::generate(), user_uuid)
            .await?;

        assert_eq!(merged.total_items, 1);

        Ok(())
    }

    #[tokio::test]
    async fn summary_waives_shipping_above_minimum_order() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();
        let variant = helpers::stocked_variant(&ctx, 125_00, 0, 10).await?;

        helpers::insert_location(&ctx, "175001", 50_00, 200_00, true).await?;

        ctx.carts.add_line(&owner, variant, 2).await?;

        let summary = ctx.carts.cart_summary(&owner, "175001").await?;

        assert_eq!(summary.subtotal, 250_00);
        assert_eq!(summary.shipping, 0);
        assert_eq!(summary.total, 250_00);
        assert!(summary.is_free_shipping);
        assert_eq!(summary.free_shipping_threshold, 200_00);

        Ok(())
    }

    #[tokio::test]
    async fn summary_charges_shipping_and_tax() -> TestResult {
        let ctx = TestContext::new().await;
        let carts = PgCartsService::new(ctx.db.clone()).with_tax_rate(500);
        let owner = user();
        let variant = helpers::stocked_variant(&ctx, 100_00, 0, 10).await?;

        helpers::insert_location(&ctx, "175001", 50_00, 200_00, true).await?;

        carts.add_line(&owner, variant, 1).await?;

        let summary = carts.cart_summary(&owner, "175001").await?;

        assert_eq!(summary.subtotal, 100_00);
        assert_eq!(summary.tax_amount, 5_00);
        assert_eq!(summary.shipping, 50_00);
        assert_eq!(summary.total, 155_00);
        assert!(!summary.is_free_shipping);

        Ok(())
    }

    #[tokio::test]
    async fn summary_rejects_bad_or_unserviceable_pincode() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = user();

        let malformed = ctx.carts.cart_summary(&owner, "12").await;
        let unserviceable = ctx.carts.cart_summary(&owner, "560001").await;

        assert_eq!(
            malformed.err().map(|e| e.kind()),
            Some(ErrorKind::InvalidArgument)
        );
        assert_eq!(
            unserviceable.err().map(|e| e.kind()),
            Some(ErrorKind::DeliveryUnavailable)
        );

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_adds_never_exceed_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = helpers::stocked_variant(&ctx, 10_00, 0, 5).await?;
        let started = ctx.carts.start_anonymous_cart().await?;
        let owner = Arc::new(CartOwner::Anonymous(started.token));

        let mut tasks = tokio::task::JoinSet::new();

        for _ in 0..12 {
            let carts = ctx.carts.clone();
            let owner = Arc::clone(&owner);

            tasks.spawn(async move { carts.add_line(&owner, variant, 1).await });
        }

        let mut accepted = 0;

        while let Some(result) = tasks.join_next().await {
            match result? {
                Ok(_) => accepted += 1,
                Err(CartsServiceError::InsufficientStock { available }) => {
                    assert_eq!(available, 5);
                }
                Err(error) => return Err(error.into()),
            }
        }

        let cart = ctx.carts.get_or_create_cart(&owner).await?;

        assert_eq!(accepted, 5);
        assert_eq!(cart.total_items, 5);

        Ok(())
    }
}
