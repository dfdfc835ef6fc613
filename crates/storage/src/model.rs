//! Persisted records.
//!
//! Records are returned by the store exactly as stored; the `*Draft` and
//! `New*` types carry what a caller supplies when inserting or updating.

use chrono::{DateTime, Utc};
use common::{
    CartId, CartItemId, CategoryId, Money, OrderId, OrderItemId, OrderStatus, PaymentType,
    ProductId, Role, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A registered user and their API credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub api_token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub api_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Editable fields of a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// A catalog product.
///
/// `stock` is the only field touched by checkout and cancellation; everything
/// else is maintained by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub product_name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Money,
    /// Percentage off the list price, `0..=100`.
    pub discount: Option<Decimal>,
    pub stock: u32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The discounted price shown to shoppers.
    ///
    /// Checkout charges `price`; this value is for display.
    pub fn selling_price(&self) -> Money {
        match self.discount {
            Some(percent) if !percent.is_zero() => self.price.discounted(percent),
            _ => self.price,
        }
    }

    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }
}

/// Editable fields of a product, excluding stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub category_id: Option<CategoryId>,
    pub product_name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Money,
    pub discount: Option<Decimal>,
    pub image_url: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A cart line. Holds no price: prices are read live at checkout.
///
/// `product_id` is not a foreign key and may refer to a deleted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

/// An order header. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_type: PaymentType,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_type: PaymentType,
    pub shipping_address: String,
}

/// A line of a placed order with its price frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Money,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.price_at_purchase.multiply(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: Money, discount: Option<Decimal>) -> Product {
        Product {
            id: ProductId::new(),
            category_id: None,
            product_name: "Kettle".to_string(),
            slug: "kettle".to_string(),
            description: None,
            price,
            discount,
            stock: 3,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn selling_price_without_discount_is_list_price() {
        let p = product(Money::from_major(40), None);
        assert_eq!(p.selling_price(), Money::from_major(40));

        let p = product(Money::from_major(40), Some(Decimal::ZERO));
        assert_eq!(p.selling_price(), Money::from_major(40));
    }

    #[test]
    fn selling_price_applies_discount() {
        let p = product(Money::from_major(40), Some(Decimal::from(25)));
        assert_eq!(p.selling_price(), Money::from_major(30));
    }

    #[test]
    fn has_stock_for_is_inclusive() {
        let p = product(Money::from_major(1), None);
        assert!(p.has_stock_for(3));
        assert!(!p.has_stock_for(4));
    }

    #[test]
    fn order_item_line_total() {
        let item = OrderItem {
            id: OrderItemId::new(),
            order_id: OrderId::new(),
            product_id: ProductId::new(),
            quantity: 3,
            price_at_purchase: Money::from_cents(1250),
        };
        assert_eq!(item.line_total(), Money::from_cents(3750));
    }
}
