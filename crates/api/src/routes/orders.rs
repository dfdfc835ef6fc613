//! Order viewing, cancellation and admin status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::OrderId;
use domain::OrderDetails;
use serde::{Deserialize, Serialize};
use storage::{Order, Store};

use super::AppState;
use super::extract::{AdminUser, AuthUser, Payload, parse_id};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub message: &'static str,
    pub order: Order,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    pub order: OrderDetails,
}

/// GET /api/orders — the caller's orders, or every order for admins.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
) -> Result<Json<Vec<OrderDetails>>, ApiError> {
    Ok(Json(state.orders.list(&actor).await?))
}

/// GET /api/orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OrderDetails>, ApiError> {
    let id: OrderId = parse_id(&id, "Order")?;
    Ok(Json(state.orders.get(&actor, id).await?))
}

/// PUT /api/orders/{id}/cancel
#[tracing::instrument(skip(state))]
pub async fn cancel<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>, ApiError> {
    let id: OrderId = parse_id(&id, "Order")?;
    let order = state.orders.cancel(&actor, id).await?;
    Ok(Json(CancelResponse {
        message: "Order cancelled successfully.",
        order,
    }))
}

/// PUT /api/admin/orders/{id}/status — admin only.
#[tracing::instrument(skip(state, body))]
pub async fn update_status<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(actor): AdminUser,
    Path(id): Path<String>,
    body: Result<Payload<StatusRequest>, ApiError>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id: OrderId = parse_id(&id, "Order")?;
    // A missing order outranks a malformed body.
    let req = match body {
        Ok(Payload(req)) => req,
        Err(rejection) => {
            state.orders.get(&actor, id).await?;
            return Err(rejection);
        }
    };
    let order = state.orders.update_status(&actor, id, &req.status).await?;
    Ok(Json(StatusResponse {
        message: "Order status updated",
        order,
    }))
}
