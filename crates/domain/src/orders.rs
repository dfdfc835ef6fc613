//! Order lifecycle: viewing, customer cancellation and admin status updates.

use std::sync::Arc;

use common::{OrderId, OrderStatus};
use serde::Serialize;
use storage::{Order, OrderItem, OrderScope, Store, StoreTx};

use crate::{Actor, DomainError, RestockPolicy};

/// An order header together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}

/// Manages order status after checkout.
///
/// Any status may be set by an admin; there is no transition graph beyond
/// the customer cancellation rule. Entering `Cancelled` through the admin
/// path returns every line's quantity to stock exactly once.
pub struct OrderLifecycle<S: Store> {
    store: Arc<S>,
    policy: RestockPolicy,
}

impl<S: Store> OrderLifecycle<S> {
    pub fn new(store: Arc<S>, policy: RestockPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> RestockPolicy {
        self.policy
    }

    /// Lists orders visible to the actor, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, actor: &Actor) -> Result<Vec<OrderDetails>, DomainError> {
        let scope = if actor.is_admin() {
            OrderScope::All
        } else {
            OrderScope::User(actor.user_id)
        };

        let orders = self.store.list_orders(scope).await?;
        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            let order_items = self.store.order_items(order.id).await?;
            details.push(OrderDetails { order, order_items });
        }
        Ok(details)
    }

    /// Loads one order. Orders owned by someone else look missing to non-admins.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, actor: &Actor, id: OrderId) -> Result<OrderDetails, DomainError> {
        let order = self
            .store
            .get_order(id)
            .await?
            .filter(|order| actor.can_see(order.user_id))
            .ok_or_else(|| DomainError::not_found("Order", id))?;

        let order_items = self.store.order_items(order.id).await?;
        Ok(OrderDetails { order, order_items })
    }

    /// Cancels an order on the customer's behalf.
    ///
    /// Only `Pending` and `Processing` orders can be cancelled. Stock is
    /// returned only when the restock policy says so.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, actor: &Actor, id: OrderId) -> Result<Order, DomainError> {
        let mut tx = self.store.begin().await?;

        let order = tx
            .lock_order(id)
            .await?
            .filter(|order| actor.can_see(order.user_id))
            .ok_or_else(|| DomainError::not_found("Order", id))?;

        if !order.status.can_customer_cancel() {
            return Err(DomainError::InvalidState {
                current: order.status,
                action: "cancelled",
            });
        }

        let restocked = if self.policy.restock_on_customer_cancel {
            restock(&mut tx, id).await?
        } else {
            0
        };

        let order = tx.set_order_status(id, OrderStatus::Cancelled).await?;
        tx.commit().await?;

        metrics::counter!("orders_cancelled_total", "source" => "customer").increment(1);
        if restocked > 0 {
            metrics::counter!("orders_restocked_units_total").increment(restocked);
        }
        tracing::info!(order_id = %id, restocked, "Order cancelled by customer");

        Ok(order)
    }

    /// Sets an order's status. Admin only.
    ///
    /// Moving into `Cancelled` from any other status restocks every line
    /// whose product still exists. The order row stays locked until commit,
    /// so two concurrent cancellations cannot both restock.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: OrderId,
        status: &str,
    ) -> Result<OrderDetails, DomainError> {
        actor.require_admin()?;

        let mut tx = self.store.begin().await?;

        let current = tx
            .lock_order(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))?;

        let target: OrderStatus = status
            .parse()
            .map_err(|_| DomainError::validation("The selected status is invalid."))?;

        let restocked = if target == OrderStatus::Cancelled && current.status != target {
            restock(&mut tx, id).await?
        } else {
            0
        };

        let order = tx.set_order_status(id, target).await?;
        let order_items = tx.order_items(id).await?;
        tx.commit().await?;

        if target == OrderStatus::Cancelled && current.status != target {
            metrics::counter!("orders_cancelled_total", "source" => "admin").increment(1);
            metrics::counter!("orders_restocked_units_total").increment(restocked);
        }
        tracing::info!(
            order_id = %id,
            from = %current.status,
            to = %target,
            restocked,
            "Order status updated"
        );

        Ok(OrderDetails { order, order_items })
    }
}

/// Adds every line's quantity back to its product, skipping deleted products.
/// Returns the number of units restocked.
async fn restock<T: StoreTx>(tx: &mut T, order_id: OrderId) -> Result<u64, DomainError> {
    let mut units = 0u64;
    for item in tx.order_items(order_id).await? {
        if tx.increment_stock(item.product_id, item.quantity).await? {
            units += u64::from(item.quantity);
        } else {
            tracing::warn!(
                order_id = %order_id,
                product_id = %item.product_id,
                "Skipping restock for deleted product"
            );
        }
    }
    Ok(units)
}
