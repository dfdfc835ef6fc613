//! Per-user shopping carts.

use std::collections::HashMap;
use std::sync::Arc;

use common::{CartItemId, Money, ProductId};
use serde::Serialize;
use storage::{Cart, CartItem, Product, Store, StoreError};

use crate::{Actor, DomainError};

/// A cart line joined with its live product.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    /// `None` when the product has been deleted since the line was added.
    pub product: Option<Product>,
}

impl CartLine {
    /// Price times quantity at the current list price; zero for dangling lines.
    pub fn line_total(&self) -> Money {
        self.product
            .as_ref()
            .map(|p| p.price.multiply(self.item.quantity))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub cart: Cart,
    pub items: Vec<CartLine>,
    /// What checkout would charge right now.
    pub total: Money,
}

pub struct CartService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> CartService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the actor's cart, creating an empty one on first use.
    #[tracing::instrument(skip(self))]
    pub async fn view(&self, actor: &Actor) -> Result<CartView, DomainError> {
        let cart = self.store.get_or_create_cart(actor.user_id).await?;
        let items = self.store.cart_items(cart.id).await?;

        let ids: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
        let products: HashMap<ProductId, Product> = self
            .store
            .get_products(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let items: Vec<CartLine> = items
            .into_iter()
            .map(|item| CartLine {
                product: products.get(&item.product_id).cloned(),
                item,
            })
            .collect();

        let total = items.iter().map(CartLine::line_total).sum();
        Ok(CartView { cart, items, total })
    }

    /// Adds a product to the cart, merging with an existing line for it. The
    /// merge is a single store operation, so concurrent adds never split or
    /// drop a line.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        actor: &Actor,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem, DomainError> {
        ensure_quantity(quantity)?;

        self.store
            .get_product(product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| DomainError::not_found("Product", product_id))?;

        let cart = self.store.get_or_create_cart(actor.user_id).await?;
        self.store
            .add_cart_item(cart.id, product_id, quantity)
            .await
            .map_err(|err| match err {
                StoreError::OutOfRange(_) => DomainError::validation("The quantity is too large."),
                other => other.into(),
            })
    }

    /// Sets the quantity of one of the actor's cart lines.
    #[tracing::instrument(skip(self))]
    pub async fn update_item(
        &self,
        actor: &Actor,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, DomainError> {
        ensure_quantity(quantity)?;
        self.owned_item(actor, item_id).await?;

        self.store
            .update_cart_item(item_id, quantity)
            .await?
            .ok_or_else(|| DomainError::not_found("Cart item", item_id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, actor: &Actor, item_id: CartItemId) -> Result<(), DomainError> {
        self.owned_item(actor, item_id).await?;
        if self.store.delete_cart_item(item_id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("Cart item", item_id))
        }
    }

    /// Empties the actor's cart, returning how many lines were removed.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, actor: &Actor) -> Result<u64, DomainError> {
        match self.store.find_cart(actor.user_id).await? {
            Some(cart) => Ok(self.store.clear_cart(cart.id).await?),
            None => Ok(0),
        }
    }

    async fn owned_item(&self, actor: &Actor, item_id: CartItemId) -> Result<CartItem, DomainError> {
        let cart = self
            .store
            .find_cart(actor.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Cart item", item_id))?;

        self.store
            .cart_items(cart.id)
            .await?
            .into_iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| DomainError::not_found("Cart item", item_id))
    }
}

fn ensure_quantity(quantity: u32) -> Result<(), DomainError> {
    if quantity == 0 {
        return Err(DomainError::validation("The quantity must be at least 1."));
    }
    Ok(())
}
