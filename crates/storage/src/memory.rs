use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use chrono::Utc;
use common::{
    CartId, CartItemId, CategoryId, OrderId, OrderItemId, OrderStatus, ProductId, Role, UserId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    Cart, CartItem, Category, CategoryDraft, NewOrder, NewOrderItem, NewUser, Order, OrderItem,
    OrderScope, Page, Product, ProductDraft, ProductQuery, Result, StoreError, User,
    store::{Store, StoreTx},
};

/// Every table of the in-memory store. Vectors keep insertion order, which
/// breaks ties between rows created within the same clock tick.
#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: Vec<User>,
    categories: Vec<Category>,
    products: Vec<Product>,
    carts: Vec<Cart>,
    cart_items: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
}

impl MemoryState {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    fn cart_for(&self, user_id: UserId) -> Option<Cart> {
        self.carts.iter().find(|c| c.user_id == user_id).cloned()
    }

    fn items_of_cart(&self, cart_id: CartId) -> Vec<CartItem> {
        self.cart_items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect()
    }

    fn remove_cart_items(&mut self, cart_id: CartId) -> u64 {
        let before = self.cart_items.len();
        self.cart_items.retain(|i| i.cart_id != cart_id);
        (before - self.cart_items.len()) as u64
    }

    fn items_of_order(&self, order_id: OrderId) -> Vec<OrderItem> {
        self.order_items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    fn slug_taken(&self, slug: &str, except: Option<CategoryId>) -> bool {
        self.categories
            .iter()
            .any(|c| c.slug == slug && Some(c.id) != except)
    }
}

/// Newest-first ordering that keeps later insertions ahead on equal timestamps.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut rows: Vec<T> = rows.iter().rev().cloned().collect();
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

#[derive(Debug, Default)]
struct Faults {
    fail_on_cart_clear: AtomicBool,
    refuse_decrement_of: StdMutex<Option<ProductId>>,
}

/// In-memory store implementation for testing and local runs.
///
/// Transactions are serialized: [`Store::begin`] takes the store's exclusive
/// lock and hands out a working copy of the state, which replaces the live
/// state only on commit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes cart clearing inside a transaction fail, to exercise rollback of
    /// a checkout that has already written its order.
    pub fn set_fail_on_cart_clear(&self, fail: bool) {
        self.faults.fail_on_cart_clear.store(fail, Ordering::SeqCst);
    }

    /// Makes the guarded stock decrement refuse `product_id`, as if a
    /// concurrent writer had taken its stock after the read. `None` clears it.
    pub fn set_refuse_decrement_of(&self, product_id: Option<ProductId>) {
        if let Ok(mut refused) = self.faults.refuse_decrement_of.lock() {
            *refused = product_id;
        }
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    /// Returns the total number of order lines stored.
    pub async fn order_item_count(&self) -> usize {
        self.state.lock().await.order_items.len()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<InMemoryTx> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(InMemoryTx {
            guard,
            working,
            faults: self.faults.clone(),
        })
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("users_email_key".to_string()));
        }
        if state.users.iter().any(|u| u.api_token == user.api_token) {
            return Err(StoreError::Duplicate("users_api_token_key".to_string()));
        }
        let user = User {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            role: user.role,
            api_token: user.api_token,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.api_token == token).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.state.lock().await.users.clone())
    }

    async fn set_user_role(&self, id: UserId, role: Role) -> Result<Option<User>> {
        let mut state = self.state.lock().await;
        Ok(state.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.role = role;
            u.clone()
        }))
    }

    async fn insert_category(&self, draft: CategoryDraft) -> Result<Category> {
        let mut state = self.state.lock().await;
        if state.slug_taken(&draft.slug, None) {
            return Err(StoreError::Duplicate("categories_slug_key".to_string()));
        }
        let category = Category {
            id: CategoryId::new(),
            name: draft.name,
            slug: draft.slug,
            description: draft.description,
            created_at: Utc::now(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Option<Category>> {
        let mut state = self.state.lock().await;
        if state.slug_taken(&draft.slug, Some(id)) {
            return Err(StoreError::Duplicate("categories_slug_key".to_string()));
        }
        Ok(state.categories.iter_mut().find(|c| c.id == id).map(|c| {
            c.name = draft.name;
            c.slug = draft.slug;
            c.description = draft.description;
            c.clone()
        }))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        if state.categories.len() == before {
            return Ok(false);
        }
        for product in state
            .products
            .iter_mut()
            .filter(|p| p.category_id == Some(id))
        {
            product.category_id = None;
        }
        Ok(true)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let state = self.state.lock().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.state.lock().await.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn insert_product(&self, draft: ProductDraft, stock: u32) -> Result<Product> {
        let mut state = self.state.lock().await;
        let product = Product {
            id: ProductId::new(),
            category_id: draft.category_id,
            product_name: draft.product_name,
            slug: draft.slug,
            description: draft.description,
            price: draft.price,
            discount: draft.discount,
            stock,
            image_url: draft.image_url,
            is_active: draft.is_active,
            created_at: Utc::now(),
        };
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
        stock: Option<u32>,
    ) -> Result<Option<Product>> {
        let mut state = self.state.lock().await;
        Ok(state.product_mut(id).map(|p| {
            p.category_id = draft.category_id;
            p.product_name = draft.product_name;
            p.slug = draft.slug;
            p.description = draft.description;
            p.price = draft.price;
            p.discount = draft.discount;
            p.image_url = draft.image_url;
            p.is_active = draft.is_active;
            if let Some(stock) = stock {
                p.stock = stock;
            }
            p.clone()
        }))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        Ok(state.products.len() != before)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.lock().await.product(id).cloned())
    }

    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        let state = self.state.lock().await;

        let category_id = match &query.category_slug {
            Some(slug) => match state.categories.iter().find(|c| &c.slug == slug) {
                Some(category) => Some(category.id),
                None => return Ok(Page::new(vec![], query.page, query.per_page, 0)),
            },
            None => None,
        };

        let matching: Vec<Product> = newest_first(&state.products, |p| p.created_at)
            .into_iter()
            .filter(|p| query.include_inactive || p.is_active)
            .filter(|p| category_id.is_none() || p.category_id == category_id)
            .filter(|p| query.matches_search(&p.product_name, p.description.as_deref()))
            .collect();

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.per_page as usize)
            .collect();

        Ok(Page::new(data, query.page, query.per_page, total))
    }

    async fn find_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        Ok(self.state.lock().await.cart_for(user_id))
    }

    async fn get_or_create_cart(&self, user_id: UserId) -> Result<Cart> {
        let mut state = self.state.lock().await;
        if let Some(cart) = state.cart_for(user_id) {
            return Ok(cart);
        }
        let cart = Cart {
            id: CartId::new(),
            user_id,
            created_at: Utc::now(),
        };
        state.carts.push(cart.clone());
        Ok(cart)
    }

    async fn cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        Ok(self.state.lock().await.items_of_cart(cart_id))
    }

    async fn add_cart_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem> {
        let mut state = self.state.lock().await;
        if let Some(line) = state
            .cart_items
            .iter_mut()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| StoreError::OutOfRange("cart_items_quantity_range".to_string()))?;
            return Ok(line.clone());
        }
        let item = CartItem {
            id: CartItemId::new(),
            cart_id,
            product_id,
            quantity,
            created_at: Utc::now(),
        };
        state.cart_items.push(item.clone());
        Ok(item)
    }

    async fn update_cart_item(&self, id: CartItemId, quantity: u32) -> Result<Option<CartItem>> {
        let mut state = self.state.lock().await;
        Ok(state.cart_items.iter_mut().find(|i| i.id == id).map(|i| {
            i.quantity = quantity;
            i.clone()
        }))
    }

    async fn delete_cart_item(&self, id: CartItemId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let before = state.cart_items.len();
        state.cart_items.retain(|i| i.id != id);
        Ok(state.cart_items.len() != before)
    }

    async fn clear_cart(&self, cart_id: CartId) -> Result<u64> {
        Ok(self.state.lock().await.remove_cart_items(cart_id))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let state = self.state.lock().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self, scope: OrderScope) -> Result<Vec<Order>> {
        let state = self.state.lock().await;
        Ok(newest_first(&state.orders, |o| o.created_at)
            .into_iter()
            .filter(|o| match scope {
                OrderScope::All => true,
                OrderScope::User(user_id) => o.user_id == user_id,
            })
            .collect())
    }

    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        Ok(self.state.lock().await.items_of_order(order_id))
    }
}

/// Transaction handle for [`InMemoryStore`].
///
/// Holds the store lock for its whole lifetime; changes go to `working` and
/// are published on commit.
pub struct InMemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    faults: Arc<Faults>,
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn find_cart(&mut self, user_id: UserId) -> Result<Option<Cart>> {
        Ok(self.working.cart_for(user_id))
    }

    async fn cart_items(&mut self, cart_id: CartId) -> Result<Vec<CartItem>> {
        Ok(self.working.items_of_cart(cart_id))
    }

    async fn lock_products(&mut self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self
            .working
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        let order = Order {
            id: OrderId::new(),
            user_id: order.user_id,
            total_amount: order.total_amount,
            status: order.status,
            payment_type: order.payment_type,
            shipping_address: order.shipping_address,
            created_at: Utc::now(),
        };
        self.working.orders.push(order.clone());
        Ok(order)
    }

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        let item = OrderItem {
            id: OrderItemId::new(),
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price_at_purchase: item.price_at_purchase,
        };
        self.working.order_items.push(item.clone());
        Ok(item)
    }

    async fn decrement_stock(&mut self, product_id: ProductId, quantity: u32) -> Result<()> {
        let refused = self
            .faults
            .refuse_decrement_of
            .lock()
            .map(|refused| *refused == Some(product_id))
            .unwrap_or(false);
        if refused {
            return Err(StoreError::InsufficientStock { product_id });
        }
        match self.working.product_mut(product_id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                Ok(())
            }
            _ => Err(StoreError::InsufficientStock { product_id }),
        }
    }

    async fn increment_stock(&mut self, product_id: ProductId, quantity: u32) -> Result<bool> {
        match self.working.product_mut(product_id) {
            Some(product) => {
                product.stock = product
                    .stock
                    .checked_add(quantity)
                    .ok_or_else(|| StoreError::OutOfRange("products_stock_range".to_string()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_cart(&mut self, cart_id: CartId) -> Result<u64> {
        if self.faults.fail_on_cart_clear.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "cart clear rejected by fault injection".to_string(),
            ));
        }
        Ok(self.working.remove_cart_items(cart_id))
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.working.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn order_items(&mut self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        Ok(self.working.items_of_order(order_id))
    }

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let order = self
            .working
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "Order",
                id: id.to_string(),
            })?;
        order.status = status;
        Ok(order.clone())
    }

    async fn commit(self) -> Result<()> {
        let InMemoryTx {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }
}
