//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::OrderId;
use domain::CheckoutRequest;
use serde::{Deserialize, Serialize};
use storage::Store;

use super::AppState;
use super::extract::{AuthUser, Payload};
use crate::error::ApiError;

/// Missing fields become empty strings and fail domain validation with 422.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub payment_type: String,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub order_id: OrderId,
}

/// POST /api/checkout — converts the caller's cart into an order.
#[tracing::instrument(skip(state, body))]
pub async fn checkout<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Payload(body): Payload<CheckoutBody>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let order = state
        .checkout
        .checkout(
            &actor,
            CheckoutRequest::new(body.shipping_address, body.payment_type),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: "Order placed successfully!",
            order_id: order.id,
        }),
    ))
}
