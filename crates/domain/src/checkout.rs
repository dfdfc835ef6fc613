//! Checkout transactor: turns a cart into an order in one transaction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use common::{Money, OrderStatus, PaymentType, ProductId};
use storage::{
    CartItem, NewOrder, NewOrderItem, Order, Product, Store, StoreError, StoreTx,
};

use crate::{Actor, DomainError};

/// Input to [`CheckoutService::checkout`], as submitted by the client.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub payment_type: String,
}

impl CheckoutRequest {
    pub fn new(shipping_address: impl Into<String>, payment_type: impl Into<String>) -> Self {
        Self {
            shipping_address: shipping_address.into(),
            payment_type: payment_type.into(),
        }
    }
}

/// Converts a user's cart into an order.
///
/// Stock check, order creation, stock decrement and cart clearing run inside
/// a single store transaction: either all of them take effect or none do.
pub struct CheckoutService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> CheckoutService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Places an order for everything in the actor's cart.
    #[tracing::instrument(skip(self, request), fields(user_id = %actor.user_id))]
    pub async fn checkout(
        &self,
        actor: &Actor,
        request: CheckoutRequest,
    ) -> Result<Order, DomainError> {
        let start = Instant::now();
        metrics::counter!("checkout_attempts_total").increment(1);

        let result = self.place_order(actor, request).await;

        match &result {
            Ok(order) => {
                metrics::counter!("checkout_completed_total").increment(1);
                metrics::histogram!("checkout_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                tracing::info!(
                    order_id = %order.id,
                    total_amount = %order.total_amount,
                    "Order placed"
                );
            }
            Err(e) => {
                metrics::counter!("checkout_failed_total", "reason" => e.kind()).increment(1);
                tracing::warn!(error = %e, "Checkout rejected");
            }
        }

        result
    }

    async fn place_order(
        &self,
        actor: &Actor,
        request: CheckoutRequest,
    ) -> Result<Order, DomainError> {
        let shipping_address = request.shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(DomainError::validation(
                "The shipping address field is required.",
            ));
        }
        let payment_type: PaymentType = request
            .payment_type
            .parse()
            .map_err(|_| DomainError::validation("The selected payment type is invalid."))?;

        let mut tx = self.store.begin().await?;

        let cart = tx
            .find_cart(actor.user_id)
            .await?
            .ok_or(DomainError::EmptyCart)?;
        let items = tx.cart_items(cart.id).await?;
        if items.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let mut ids: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
        ids.sort();
        ids.dedup();
        let products: HashMap<ProductId, Product> = tx
            .lock_products(&ids)
            .await?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let lines = resolve_lines(&items, &products)?;
        if lines.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let total_amount = order_total(&lines)?;

        let order = tx
            .insert_order(NewOrder {
                user_id: actor.user_id,
                total_amount,
                status: OrderStatus::Pending,
                payment_type,
                shipping_address: shipping_address.to_string(),
            })
            .await?;

        for (item, product) in &lines {
            tx.insert_order_item(NewOrderItem {
                order_id: order.id,
                product_id: product.id,
                quantity: item.quantity,
                price_at_purchase: product.price,
            })
            .await?;

            tx.decrement_stock(product.id, item.quantity)
                .await
                .map_err(|e| match e {
                    StoreError::InsufficientStock { product_id } => {
                        DomainError::InsufficientStock {
                            product_id,
                            product_name: product.product_name.clone(),
                        }
                    }
                    other => other.into(),
                })?;
        }

        tx.clear_cart(cart.id).await?;
        tx.commit().await?;

        Ok(order)
    }
}

/// Pairs each cart line with its live product, skipping lines whose product
/// was deleted, and checks every remaining line against current stock.
fn resolve_lines<'a>(
    items: &'a [CartItem],
    products: &'a HashMap<ProductId, Product>,
) -> Result<Vec<(&'a CartItem, &'a Product)>, DomainError> {
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let Some(product) = products.get(&item.product_id) else {
            tracing::debug!(
                cart_item_id = %item.id,
                product_id = %item.product_id,
                "Skipping cart line for deleted product"
            );
            continue;
        };
        if !product.has_stock_for(item.quantity) {
            return Err(DomainError::InsufficientStock {
                product_id: product.id,
                product_name: product.product_name.clone(),
            });
        }
        lines.push((item, product));
    }
    Ok(lines)
}

/// Sums price times quantity over the lines. Fails when the total overflows
/// or does not fit the order ledger.
fn order_total(lines: &[(&CartItem, &Product)]) -> Result<Money, DomainError> {
    lines
        .iter()
        .try_fold(Money::zero(), |total, (item, product)| {
            product
                .price
                .checked_multiply(item.quantity)
                .and_then(|line_total| total.checked_add(line_total))
        })
        .filter(Money::is_storable)
        .ok_or_else(|| {
            DomainError::validation(format!(
                "The order total must not exceed {}.",
                Money::max_stored()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{CartId, CartItemId};

    fn product(stock: u32) -> Product {
        Product {
            id: ProductId::new(),
            category_id: None,
            product_name: "Lamp".to_string(),
            slug: "lamp".to_string(),
            description: None,
            price: Money::from_major(10),
            discount: None,
            stock,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn line(product_id: ProductId, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(),
            cart_id: CartId::new(),
            product_id,
            quantity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn dangling_lines_are_skipped() {
        let p = product(5);
        let products = HashMap::from([(p.id, p.clone())]);
        let items = vec![line(ProductId::new(), 1), line(p.id, 2)];

        let lines = resolve_lines(&items, &products).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].1.id, p.id);
    }

    #[test]
    fn short_stock_names_the_product() {
        let p = product(1);
        let products = HashMap::from([(p.id, p.clone())]);
        let items = vec![line(p.id, 2)];

        let err = resolve_lines(&items, &products).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient stock for product: Lamp");
    }

    #[test]
    fn exact_stock_is_enough() {
        let p = product(2);
        let products = HashMap::from([(p.id, p.clone())]);
        let items = vec![line(p.id, 2)];

        assert_eq!(resolve_lines(&items, &products).unwrap().len(), 1);
    }

    #[test]
    fn total_sums_lines() {
        let lamp = product(5);
        let mut vase = product(5);
        vase.price = Money::from_cents(1250);
        let (a, b) = (line(lamp.id, 3), line(vase.id, 2));

        let total = order_total(&[(&a, &lamp), (&b, &vase)]).unwrap();
        assert_eq!(total, Money::from_major(55));
    }

    #[test]
    fn oversized_total_is_refused() {
        let mut p = product(u32::MAX);
        p.price = Money::new(rust_decimal::Decimal::MAX);
        let item = line(p.id, 2);
        assert!(matches!(
            order_total(&[(&item, &p)]),
            Err(DomainError::Validation(_))
        ));

        p.price = Money::max_stored();
        assert!(matches!(
            order_total(&[(&item, &p)]),
            Err(DomainError::Validation(_))
        ));
    }
}
