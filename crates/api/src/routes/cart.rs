//! Cart endpoints for the authenticated user.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CartItemId, ProductId};
use domain::{CartView, DomainError};
use serde::{Deserialize, Serialize};
use storage::{CartItem, Store};

use super::AppState;
use super::extract::{AuthUser, Payload, parse_id};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Option<ProductId>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: Option<u32>,
}

#[derive(Serialize)]
pub struct ClearResponse {
    pub message: &'static str,
    pub removed: u64,
}

/// GET /api/cart
#[tracing::instrument(skip(state))]
pub async fn show<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(state.carts.view(&actor).await?))
}

/// POST /api/cart/items
#[tracing::instrument(skip(state))]
pub async fn add_item<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Payload(req): Payload<AddItemRequest>,
) -> Result<(StatusCode, Json<CartItem>), ApiError> {
    let product_id = req
        .product_id
        .ok_or_else(|| DomainError::validation("The product id field is required."))?;
    let item = state
        .carts
        .add_item(&actor, product_id, req.quantity.unwrap_or(1))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/cart/items/{id}
#[tracing::instrument(skip(state))]
pub async fn update_item<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Payload(req): Payload<UpdateItemRequest>,
) -> Result<Json<CartItem>, ApiError> {
    let id: CartItemId = parse_id(&id, "Cart item")?;
    let quantity = req
        .quantity
        .ok_or_else(|| DomainError::validation("The quantity field is required."))?;
    Ok(Json(state.carts.update_item(&actor, id, quantity).await?))
}

/// DELETE /api/cart/items/{id}
#[tracing::instrument(skip(state))]
pub async fn remove_item<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: CartItemId = parse_id(&id, "Cart item")?;
    state.carts.remove_item(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/cart/clear
#[tracing::instrument(skip(state))]
pub async fn clear<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
) -> Result<Json<ClearResponse>, ApiError> {
    let removed = state.carts.clear(&actor).await?;
    Ok(Json(ClearResponse {
        message: "Cart cleared",
        removed,
    }))
}
