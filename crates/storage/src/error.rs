use common::ProductId;
use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional stock decrement found fewer units than requested.
    #[error("Insufficient stock for product {product_id}")]
    InsufficientStock { product_id: ProductId },

    /// The database aborted the transaction because of a concurrent writer
    /// (serialization failure or deadlock). The caller may retry from scratch.
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    /// A unique constraint was violated.
    #[error("Duplicate value violates {0}")]
    Duplicate(String),

    /// A value would leave the range its column allows. Carries the name of
    /// the range constraint.
    #[error("Value out of range for {0}")]
    OutOfRange(String),

    /// A row the transaction was about to update no longer exists.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The backing store refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be mapped back into a record.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.code().as_deref() {
                // serialization_failure, deadlock_detected
                Some("40001") | Some("40P01") => {
                    return StoreError::TransactionConflict(db_err.message().to_string());
                }
                // unique_violation
                Some("23505") => {
                    return StoreError::Duplicate(
                        db_err.constraint().unwrap_or("unique constraint").to_string(),
                    );
                }
                // check_violation on one of the named range constraints
                Some("23514") => {
                    if let Some(constraint) = db_err.constraint()
                        && constraint.ends_with("_range")
                    {
                        return StoreError::OutOfRange(constraint.to_string());
                    }
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
