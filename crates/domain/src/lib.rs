//! Storefront domain layer.
//!
//! This crate provides the business operations on top of the store:
//! - `CheckoutService`: converts a cart into an order in one transaction
//! - `OrderLifecycle`: order viewing, cancellation and admin status updates
//! - `CatalogService`, `CartService`, `UserService`: the surrounding CRUD
//!
//! Every operation takes the calling [`Actor`] and checks its role on entry.

pub mod actor;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod orders;
pub mod policy;
pub mod users;

pub use actor::Actor;
pub use cart::{CartLine, CartService, CartView};
pub use catalog::{
    CatalogService, CategoryInput, ProductInput, ProductListing, ProductPatch, slugify,
};
pub use checkout::{CheckoutRequest, CheckoutService};
pub use error::DomainError;
pub use orders::{OrderDetails, OrderLifecycle};
pub use policy::RestockPolicy;
pub use users::{IssuedUser, UserInput, UserService};
