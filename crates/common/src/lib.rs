//! Shared types for the storefront workspace.
//!
//! Everything here is plain data: typed identifiers, the [`Money`] amount,
//! and the small enums ([`OrderStatus`], [`PaymentType`], [`Role`]) that both
//! the storage layer and the domain layer need to agree on.

mod money;
mod status;
mod types;

pub use money::Money;
pub use status::{OrderStatus, ParseEnumError, PaymentType, Role};
pub use types::{CartId, CartItemId, CategoryId, OrderId, OrderItemId, ProductId, UserId};
