//! Domain error types.

use common::{OrderStatus, ProductId};
use storage::StoreError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Caller input failed validation.
    #[error("{0}")]
    Validation(String),

    /// No valid credential was presented.
    #[error("Unauthenticated.")]
    Unauthenticated,

    /// The caller is authenticated but lacks the admin role.
    #[error("Forbidden: Admins only")]
    Forbidden,

    /// The entity does not exist, or is not visible to the caller.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// Checkout found nothing to order.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line asks for more units than the product has.
    #[error("Insufficient stock for product: {product_name}")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
    },

    /// The order's current status does not allow the action.
    #[error("Order cannot be {action} now.")]
    InvalidState {
        current: OrderStatus,
        action: &'static str,
    },

    /// A concurrent writer aborted the transaction.
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::Unauthenticated => "unauthenticated",
            DomainError::Forbidden => "forbidden",
            DomainError::NotFound { .. } => "not_found",
            DomainError::EmptyCart => "empty_cart",
            DomainError::InsufficientStock { .. } => "insufficient_stock",
            DomainError::InvalidState { .. } => "invalid_state",
            DomainError::TransactionConflict(_) => "conflict",
            DomainError::Store(_) => "store",
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientStock { product_id } => DomainError::InsufficientStock {
                product_id,
                product_name: product_id.to_string(),
            },
            StoreError::TransactionConflict(msg) => DomainError::TransactionConflict(msg),
            StoreError::NotFound { entity, id } => DomainError::NotFound { entity, id },
            StoreError::Duplicate(constraint) => {
                DomainError::Validation(format!("The value violates {constraint}."))
            }
            StoreError::OutOfRange(constraint) => {
                DomainError::Validation(format!("The value is out of range for {constraint}."))
            }
            other => DomainError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_lift_into_business_variants() {
        let id = ProductId::new();
        assert!(matches!(
            DomainError::from(StoreError::InsufficientStock { product_id: id }),
            DomainError::InsufficientStock { product_id, .. } if product_id == id
        ));
        assert!(matches!(
            DomainError::from(StoreError::TransactionConflict("deadlock".into())),
            DomainError::TransactionConflict(_)
        ));
        assert!(matches!(
            DomainError::from(StoreError::Duplicate("categories_slug_key".into())),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            DomainError::from(StoreError::OutOfRange("products_stock_range".into())),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            DomainError::from(StoreError::Unavailable("down".into())),
            DomainError::Store(_)
        ));
    }

    #[test]
    fn invalid_state_message_names_action() {
        let err = DomainError::InvalidState {
            current: OrderStatus::Shipped,
            action: "cancelled",
        };
        assert_eq!(err.to_string(), "Order cannot be cancelled now.");
    }
}
