use async_trait::async_trait;
use common::{CartId, CartItemId, CategoryId, OrderId, OrderStatus, ProductId, Role, UserId};

use crate::{
    Cart, CartItem, Category, CategoryDraft, NewOrder, NewOrderItem, NewUser, Order, OrderItem,
    OrderScope, Page, Product, ProductDraft, ProductQuery, Result, User,
};

/// Core trait for storefront persistence.
///
/// Methods on this trait each run as a single statement (or a single implicit
/// transaction). Anything that must touch several rows atomically goes
/// through [`Store::begin`]. All implementations must be thread-safe.
#[async_trait]
pub trait Store: Send + Sync {
    /// The transaction handle type produced by [`Store::begin`].
    type Tx: StoreTx + 'static;

    /// Opens a transaction.
    ///
    /// Nothing done through the returned handle is visible to other callers
    /// until [`StoreTx::commit`]; dropping the handle rolls it back.
    async fn begin(&self) -> Result<Self::Tx>;

    // -- Users --

    async fn insert_user(&self, user: NewUser) -> Result<User>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>>;

    /// Lists users, oldest first.
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn set_user_role(&self, id: UserId, role: Role) -> Result<Option<User>>;

    // -- Catalog --

    /// Inserts a category. Fails with `Duplicate` if the slug is taken.
    async fn insert_category(&self, draft: CategoryDraft) -> Result<Category>;

    async fn update_category(&self, id: CategoryId, draft: CategoryDraft)
    -> Result<Option<Category>>;

    /// Deletes a category and detaches its products. Returns false if absent.
    async fn delete_category(&self, id: CategoryId) -> Result<bool>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>>;

    /// Lists categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn insert_product(&self, draft: ProductDraft, stock: u32) -> Result<Product>;

    /// Overwrites the editable fields of a product. Stock is only written when
    /// `stock` is `Some`.
    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
        stock: Option<u32>,
    ) -> Result<Option<Product>>;

    /// Deletes a product. Cart lines and order lines that reference it are
    /// left in place. Returns false if absent.
    async fn delete_product(&self, id: ProductId) -> Result<bool>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Fetches the products that still exist among `ids`, in no particular order.
    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>>;

    async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>>;

    // -- Carts --

    async fn find_cart(&self, user_id: UserId) -> Result<Option<Cart>>;

    /// Returns the user's cart, creating it on first use.
    async fn get_or_create_cart(&self, user_id: UserId) -> Result<Cart>;

    /// Lists the lines of a cart, oldest first.
    async fn cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>>;

    /// Adds `quantity` units of a product to a cart in one step, merging into
    /// the existing line for that product if there is one.
    ///
    /// Fails with `OutOfRange` when the merged quantity would not fit a `u32`.
    async fn add_cart_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem>;

    async fn update_cart_item(&self, id: CartItemId, quantity: u32) -> Result<Option<CartItem>>;

    async fn delete_cart_item(&self, id: CartItemId) -> Result<bool>;

    /// Deletes every line of a cart, returning how many were removed.
    async fn clear_cart(&self, cart_id: CartId) -> Result<u64>;

    // -- Orders --

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists orders newest first.
    async fn list_orders(&self, scope: OrderScope) -> Result<Vec<Order>>;

    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>>;
}

/// A scoped unit of work against the store.
///
/// Commit consumes the handle. Any other exit path, including an early `?`
/// return or a panic, drops it and discards every change made through it.
#[async_trait]
pub trait StoreTx: Send {
    async fn find_cart(&mut self, user_id: UserId) -> Result<Option<Cart>>;

    async fn cart_items(&mut self, cart_id: CartId) -> Result<Vec<CartItem>>;

    /// Reads the products that still exist among `ids` and locks them for the
    /// rest of the transaction. Rows are locked in id order.
    async fn lock_products(&mut self, ids: &[ProductId]) -> Result<Vec<Product>>;

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order>;

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem>;

    /// Subtracts `quantity` from a product's stock only if enough remains.
    ///
    /// Fails with `InsufficientStock` when the guard does not hold; stock is
    /// never driven below zero.
    async fn decrement_stock(&mut self, product_id: ProductId, quantity: u32) -> Result<()>;

    /// Adds `quantity` back to a product's stock. Returns false if the product
    /// no longer exists, and fails with `OutOfRange` when the new stock would
    /// not fit a `u32`.
    async fn increment_stock(&mut self, product_id: ProductId, quantity: u32) -> Result<bool>;

    async fn clear_cart(&mut self, cart_id: CartId) -> Result<u64>;

    /// Reads an order and locks it for the rest of the transaction.
    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>>;

    async fn order_items(&mut self, order_id: OrderId) -> Result<Vec<OrderItem>>;

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<Order>;

    /// Makes every change made through this handle durable and visible.
    async fn commit(self) -> Result<()>;
}
