//! HTTP handlers, grouped by resource.

pub mod cart;
pub mod categories;
pub mod checkout;
pub mod extract;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod users;

use std::sync::Arc;

use domain::{
    CartService, CatalogService, CheckoutService, OrderLifecycle, RestockPolicy, UserService,
};
use storage::Store;

use crate::config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub users: UserService<S>,
    pub catalog: CatalogService<S>,
    pub carts: CartService<S>,
    pub checkout: CheckoutService<S>,
    pub orders: OrderLifecycle<S>,
}

impl<S: Store> AppState<S> {
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            users: UserService::new(store.clone()),
            catalog: CatalogService::new(store.clone(), config.products_per_page),
            carts: CartService::new(store.clone()),
            checkout: CheckoutService::new(store.clone()),
            orders: OrderLifecycle::new(
                store,
                RestockPolicy::new(config.restock_on_customer_cancel),
            ),
        }
    }
}
