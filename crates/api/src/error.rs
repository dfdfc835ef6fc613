//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;

/// API-level error type that maps to HTTP responses.
///
/// Every error renders as `{"message": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Domain logic error.
    Domain(DomainError),
    /// The request body or query string could not be decoded.
    Rejected { status: StatusCode, message: String },
    /// Internal server error.
    Internal(String),
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        ApiError::Domain(DomainError::not_found(entity, id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Rejected { status, message } => (status, message),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server Error".to_string())
            }
        };

        let body = serde_json::json!({ "message": message });
        (status, Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        DomainError::Unauthenticated => (StatusCode::UNAUTHORIZED, err.to_string()),
        DomainError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::EmptyCart
        | DomainError::InsufficientStock { .. }
        | DomainError::InvalidState { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        DomainError::TransactionConflict(_) => (
            StatusCode::CONFLICT,
            "The request conflicted with another update. Please retry.".to_string(),
        ),
        DomainError::Store(_) => {
            tracing::error!(error = %err, "store error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Server Error".to_string())
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::StoreError;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(
            status_of(DomainError::validation("bad")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(DomainError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(DomainError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(DomainError::not_found("Order", "x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(DomainError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DomainError::TransactionConflict("deadlock".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::Store(StoreError::Unavailable("down".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
