//! Persistence for the storefront.
//!
//! The [`Store`] trait covers plain reads and single-statement writes; every
//! multi-step mutation goes through a [`StoreTx`] obtained from
//! [`Store::begin`], which is committed explicitly and rolled back when
//! dropped. Two implementations are provided: [`InMemoryStore`] for tests and
//! local runs, and [`PostgresStore`] for production.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemoryStore, InMemoryTx};
pub use model::{
    Cart, CartItem, Category, CategoryDraft, NewOrder, NewOrderItem, NewUser, Order, OrderItem,
    Product, ProductDraft, User,
};
pub use postgres::{PostgresStore, PostgresTx};
pub use query::{OrderScope, Page, ProductQuery};
pub use store::{Store, StoreTx};
