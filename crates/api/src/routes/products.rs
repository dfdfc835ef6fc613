//! Catalog product endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{CategoryId, Money, ProductId};
use domain::{ProductInput, ProductListing, ProductPatch};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storage::{Page, Product, Store};

use super::AppState;
use super::extract::{AdminUser, AuthUser, Payload, parse_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub include_inactive: Option<bool>,
}

/// Body for both create and update; update treats absent fields as unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub category_id: Option<CategoryId>,
    pub product_name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub stock: Option<u32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub selling_price: Money,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            selling_price: product.selling_price(),
            product,
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// -- Handlers --

/// GET /api/products — paginated, filtered catalog listing.
#[tracing::instrument(skip(state, auth))]
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    auth: Option<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<ProductResponse>>, ApiError> {
    let actor = auth.map(|AuthUser(actor)| actor);
    let listing = ProductListing {
        search: params.search,
        category: params.category,
        page: params.page,
        per_page: params.per_page,
        include_inactive: params.include_inactive.unwrap_or(false),
    };

    let page = state.catalog.list_products(actor.as_ref(), listing).await?;
    Ok(Json(page.map(ProductResponse::from)))
}

/// GET /api/products/{id}
#[tracing::instrument(skip(state, auth))]
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    auth: Option<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let actor = auth.map(|AuthUser(actor)| actor);
    let id: ProductId = parse_id(&id, "Product")?;
    let product = state.catalog.get_product(actor.as_ref(), id).await?;
    Ok(Json(product.into()))
}

/// POST /api/products — admin only.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(actor): AdminUser,
    Payload(req): Payload<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let input = ProductInput {
        category_id: req.category_id,
        product_name: req.product_name.unwrap_or_default(),
        slug: req.slug,
        description: req.description,
        price: req
            .price
            .ok_or_else(|| domain::DomainError::validation("The price field is required."))?,
        discount: req.discount,
        stock: req.stock.unwrap_or(0),
        image_url: req.image_url,
        is_active: req.is_active,
    };

    let product = state.catalog.create_product(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /api/products/{id} — admin only, partial update.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(actor): AdminUser,
    Path(id): Path<String>,
    Payload(req): Payload<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id: ProductId = parse_id(&id, "Product")?;

    let patch = ProductPatch {
        category_id: req.category_id,
        product_name: req.product_name,
        slug: req.slug,
        description: req.description,
        price: req.price,
        discount: req.discount,
        stock: req.stock,
        image_url: req.image_url,
        is_active: req.is_active,
    };

    let product = state.catalog.update_product(&actor, id, patch).await?;
    Ok(Json(product.into()))
}

/// DELETE /api/products/{id} — admin only.
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(actor): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: ProductId = parse_id(&id, "Product")?;
    state.catalog.delete_product(&actor, id).await?;
    Ok(Json(MessageResponse {
        message: "Product deleted successfully",
    }))
}
