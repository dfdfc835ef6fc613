//! Category endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CategoryId;
use domain::CategoryInput;
use serde::Deserialize;
use storage::{Category, Store};

use super::AppState;
use super::extract::{AdminUser, Payload, parse_id};
use super::products::MessageResponse;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(req: CategoryRequest) -> Self {
        CategoryInput {
            name: req.name,
            slug: req.slug,
            description: req.description,
        }
    }
}

/// GET /api/categories
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// GET /api/categories/{id}
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let id: CategoryId = parse_id(&id, "Category")?;
    Ok(Json(state.catalog.get_category(id).await?))
}

/// POST /api/categories — admin only.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(actor): AdminUser,
    Payload(req): Payload<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.catalog.create_category(&actor, req.into()).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id} — admin only.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(actor): AdminUser,
    Path(id): Path<String>,
    Payload(req): Payload<CategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let id: CategoryId = parse_id(&id, "Category")?;
    Ok(Json(
        state.catalog.update_category(&actor, id, req.into()).await?,
    ))
}

/// DELETE /api/categories/{id} — admin only.
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(actor): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: CategoryId = parse_id(&id, "Category")?;
    state.catalog.delete_category(&actor, id).await?;
    Ok(Json(MessageResponse {
        message: "Category deleted successfully",
    }))
}
