use async_trait::async_trait;
use common::{
    CartId, CartItemId, CategoryId, Money, OrderId, OrderItemId, OrderStatus, PaymentType,
    ProductId, Role, UserId,
};
use rust_decimal::Decimal;
use sqlx::postgres::{PgExecutor, PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use uuid::Uuid;

use crate::{
    Cart, CartItem, Category, CategoryDraft, NewOrder, NewOrderItem, NewUser, Order, OrderItem,
    OrderScope, Page, Product, ProductDraft, ProductQuery, Result, StoreError, User,
    store::{Store, StoreTx},
};

macro_rules! user_columns {
    () => {
        "id, name, email, role, api_token, created_at"
    };
}

macro_rules! category_columns {
    () => {
        "id, name, slug, description, created_at"
    };
}

macro_rules! product_columns {
    () => {
        "id, category_id, product_name, slug, description, price, discount, stock, image_url, is_active, created_at"
    };
}

macro_rules! cart_item_columns {
    () => {
        "id, cart_id, product_id, quantity, created_at"
    };
}

macro_rules! order_columns {
    () => {
        "id, user_id, total_amount, status, payment_type, shipping_address, created_at"
    };
}

macro_rules! order_item_columns {
    () => {
        "id, order_id, product_id, quantity, price_at_purchase"
    };
}

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `url` and wraps it in a store.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{column} out of range: {value}")))
}

fn parse_column<T>(row: &PgRow, column: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e: T::Err| StoreError::Corrupt(format!("{column}: {e}")))
}

fn row_to_user(row: &PgRow) -> Result<User> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: parse_column::<Role>(row, "role")?,
        api_token: row.try_get("api_token")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_category(row: &PgRow) -> Result<Category> {
    Ok(Category {
        id: CategoryId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_product(row: &PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        category_id: row
            .try_get::<Option<Uuid>, _>("category_id")?
            .map(CategoryId::from_uuid),
        product_name: row.try_get("product_name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        price: Money::new(row.try_get::<Decimal, _>("price")?),
        discount: row.try_get("discount")?,
        stock: to_u32(row.try_get("stock")?, "products.stock")?,
        image_url: row.try_get("image_url")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_cart(row: &PgRow) -> Result<Cart> {
    Ok(Cart {
        id: CartId::from_uuid(row.try_get("id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_cart_item(row: &PgRow) -> Result<CartItem> {
    Ok(CartItem {
        id: CartItemId::from_uuid(row.try_get("id")?),
        cart_id: CartId::from_uuid(row.try_get("cart_id")?),
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        quantity: to_u32(row.try_get("quantity")?, "cart_items.quantity")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_order(row: &PgRow) -> Result<Order> {
    Ok(Order {
        id: OrderId::from_uuid(row.try_get("id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        total_amount: Money::new(row.try_get::<Decimal, _>("total_amount")?),
        status: parse_column::<OrderStatus>(row, "status")?,
        payment_type: parse_column::<PaymentType>(row, "payment_type")?,
        shipping_address: row.try_get("shipping_address")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_order_item(row: &PgRow) -> Result<OrderItem> {
    Ok(OrderItem {
        id: OrderItemId::from_uuid(row.try_get("id")?),
        order_id: OrderId::from_uuid(row.try_get("order_id")?),
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        quantity: to_u32(row.try_get("quantity")?, "order_items.quantity")?,
        price_at_purchase: Money::new(row.try_get::<Decimal, _>("price_at_purchase")?),
    })
}

fn uuids<T: Copy + Into<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|id| (*id).into()).collect()
}

/// Escapes `%`, `_` and `\` so a search term matches literally inside ILIKE.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_product_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    if !query.include_inactive {
        qb.push(" AND is_active");
    }
    if let Some(slug) = &query.category_slug {
        qb.push(" AND category_id IN (SELECT id FROM categories WHERE slug = ")
            .push_bind(slug.clone())
            .push(")");
    }
    if let Some(term) = &query.search {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (product_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

// Queries shared between pooled calls and transactions.

async fn fetch_cart<'e>(executor: impl PgExecutor<'e>, user_id: UserId) -> Result<Option<Cart>> {
    let row = sqlx::query("SELECT id, user_id, created_at FROM carts WHERE user_id = $1")
        .bind(user_id.as_uuid())
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(row_to_cart).transpose()
}

async fn fetch_cart_items<'e>(
    executor: impl PgExecutor<'e>,
    cart_id: CartId,
) -> Result<Vec<CartItem>> {
    let rows = sqlx::query(concat!(
        "SELECT ",
        cart_item_columns!(),
        " FROM cart_items WHERE cart_id = $1 ORDER BY created_at ASC, id ASC"
    ))
    .bind(cart_id.as_uuid())
    .fetch_all(executor)
    .await?;
    rows.iter().map(row_to_cart_item).collect()
}

async fn delete_cart_items<'e>(executor: impl PgExecutor<'e>, cart_id: CartId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
        .bind(cart_id.as_uuid())
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

async fn fetch_order_items<'e>(
    executor: impl PgExecutor<'e>,
    order_id: OrderId,
) -> Result<Vec<OrderItem>> {
    let rows = sqlx::query(concat!(
        "SELECT ",
        order_item_columns!(),
        " FROM order_items WHERE order_id = $1 ORDER BY id ASC"
    ))
    .bind(order_id.as_uuid())
    .fetch_all(executor)
    .await?;
    rows.iter().map(row_to_order_item).collect()
}

#[async_trait]
impl Store for PostgresStore {
    type Tx = PostgresTx;

    async fn begin(&self) -> Result<PostgresTx> {
        Ok(PostgresTx {
            tx: self.pool.begin().await?,
        })
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(concat!(
            "INSERT INTO users (id, name, email, role, api_token) VALUES ($1, $2, $3, $4, $5) RETURNING ",
            user_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.api_token)
        .fetch_one(&self.pool)
        .await?;
        row_to_user(&row)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE api_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_user).collect()
    }

    async fn set_user_role(&self, id: UserId, role: Role) -> Result<Option<User>> {
        let row = sqlx::query(concat!(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING ",
            user_columns!()
        ))
        .bind(id.as_uuid())
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn insert_category(&self, draft: CategoryDraft) -> Result<Category> {
        let row = sqlx::query(concat!(
            "INSERT INTO categories (id, name, slug, description) VALUES ($1, $2, $3, $4) RETURNING ",
            category_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .fetch_one(&self.pool)
        .await?;
        row_to_category(&row)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Option<Category>> {
        let row = sqlx::query(concat!(
            "UPDATE categories SET name = $2, slug = $3, description = $4 WHERE id = $1 RETURNING ",
            category_columns!()
        ))
        .bind(id.as_uuid())
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_category).transpose()
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            category_columns!(),
            " FROM categories WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_category).transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            category_columns!(),
            " FROM categories ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_category).collect()
    }

    async fn insert_product(&self, draft: ProductDraft, stock: u32) -> Result<Product> {
        let row = sqlx::query(concat!(
            r#"
            INSERT INTO products
                (id, category_id, product_name, slug, description, price, discount, stock, image_url, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING "#,
            product_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(draft.category_id.map(Uuid::from))
        .bind(&draft.product_name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(draft.price.amount())
        .bind(draft.discount)
        .bind(i64::from(stock))
        .bind(&draft.image_url)
        .bind(draft.is_active)
        .fetch_one(&self.pool)
        .await?;
        row_to_product(&row)
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
        stock: Option<u32>,
    ) -> Result<Option<Product>> {
        let row = sqlx::query(concat!(
            r#"
            UPDATE products SET
                category_id = $2, product_name = $3, slug = $4, description = $5,
                price = $6, discount = $7, image_url = $8, is_active = $9,
                stock = COALESCE($10, stock)
            WHERE id = $1
            RETURNING "#,
            product_columns!()
        ))
        .bind(id.as_uuid())
        .bind(draft.category_id.map(Uuid::from))
        .bind(&draft.product_name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(draft.price.amount())
        .bind(draft.discount)
        .bind(&draft.image_url)
        .bind(draft.is_active)
        .bind(stock.map(i64::from))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_product).transpose()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_product).transpose()
    }

    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE id = ANY($1)"
        ))
        .bind(uuids(ids))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products WHERE TRUE");
        push_product_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE TRUE"
        ));
        push_product_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(query.per_page))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));

        let rows = select.build().fetch_all(&self.pool).await?;
        let data = rows.iter().map(row_to_product).collect::<Result<Vec<_>>>()?;

        Ok(Page::new(
            data,
            query.page,
            query.per_page,
            u64::try_from(total).unwrap_or(0),
        ))
    }

    async fn find_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        fetch_cart(&self.pool, user_id).await
    }

    async fn get_or_create_cart(&self, user_id: UserId) -> Result<Cart> {
        sqlx::query(
            "INSERT INTO carts (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?;

        fetch_cart(&self.pool, user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "Cart",
                id: user_id.to_string(),
            })
    }

    async fn cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        fetch_cart_items(&self.pool, cart_id).await
    }

    async fn add_cart_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem> {
        let row = sqlx::query(concat!(
            "INSERT INTO cart_items (id, cart_id, product_id, quantity) VALUES ($1, $2, $3, $4) ",
            "ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity ",
            "RETURNING ",
            cart_item_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(cart_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(i64::from(quantity))
        .fetch_one(&self.pool)
        .await?;
        row_to_cart_item(&row)
    }

    async fn update_cart_item(&self, id: CartItemId, quantity: u32) -> Result<Option<CartItem>> {
        let row = sqlx::query(concat!(
            "UPDATE cart_items SET quantity = $2 WHERE id = $1 RETURNING ",
            cart_item_columns!()
        ))
        .bind(id.as_uuid())
        .bind(i64::from(quantity))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_cart_item).transpose()
    }

    async fn delete_cart_item(&self, id: CartItemId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&self, cart_id: CartId) -> Result<u64> {
        delete_cart_items(&self.pool, cart_id).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(concat!("SELECT ", order_columns!(), " FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_order).transpose()
    }

    async fn list_orders(&self, scope: OrderScope) -> Result<Vec<Order>> {
        let rows = match scope {
            OrderScope::All => {
                sqlx::query(concat!(
                    "SELECT ",
                    order_columns!(),
                    " FROM orders ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            OrderScope::User(user_id) => {
                sqlx::query(concat!(
                    "SELECT ",
                    order_columns!(),
                    " FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
                ))
                .bind(user_id.as_uuid())
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.iter().map(row_to_order).collect()
    }

    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        fetch_order_items(&self.pool, order_id).await
    }
}

/// Transaction handle for [`PostgresStore`].
///
/// Wraps a `sqlx` transaction at the default READ COMMITTED isolation level;
/// `sqlx` rolls it back when the handle is dropped without a commit.
pub struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PostgresTx {
    async fn find_cart(&mut self, user_id: UserId) -> Result<Option<Cart>> {
        fetch_cart(&mut *self.tx, user_id).await
    }

    async fn cart_items(&mut self, cart_id: CartId) -> Result<Vec<CartItem>> {
        fetch_cart_items(&mut *self.tx, cart_id).await
    }

    async fn lock_products(&mut self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(uuids(ids))
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        let row = sqlx::query(concat!(
            r#"
            INSERT INTO orders (id, user_id, total_amount, status, payment_type, shipping_address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING "#,
            order_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(order.user_id.as_uuid())
        .bind(order.total_amount.amount())
        .bind(order.status.as_str())
        .bind(order.payment_type.as_str())
        .bind(&order.shipping_address)
        .fetch_one(&mut *self.tx)
        .await?;
        row_to_order(&row)
    }

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        let row = sqlx::query(concat!(
            r#"
            INSERT INTO order_items (id, order_id, product_id, quantity, price_at_purchase)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING "#,
            order_item_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(item.order_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(i64::from(item.quantity))
        .bind(item.price_at_purchase.amount())
        .fetch_one(&mut *self.tx)
        .await?;
        row_to_order_item(&row)
    }

    async fn decrement_stock(&mut self, product_id: ProductId, quantity: u32) -> Result<()> {
        let result =
            sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
                .bind(product_id.as_uuid())
                .bind(i64::from(quantity))
                .execute(&mut *self.tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::InsufficientStock { product_id });
        }
        Ok(())
    }

    async fn increment_stock(&mut self, product_id: ProductId, quantity: u32) -> Result<bool> {
        let result = sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
            .bind(product_id.as_uuid())
            .bind(i64::from(quantity))
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&mut self, cart_id: CartId) -> Result<u64> {
        delete_cart_items(&mut *self.tx, cart_id).await
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            order_columns!(),
            " FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(row_to_order).transpose()
    }

    async fn order_items(&mut self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        fetch_order_items(&mut *self.tx, order_id).await
    }

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let row = sqlx::query(concat!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING ",
            order_columns!()
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            entity: "Order",
            id: id.to_string(),
        })?;
        row_to_order(&row)
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
