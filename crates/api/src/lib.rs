//! HTTP API server with observability for the storefront.
//!
//! Provides REST endpoints for the catalog, carts, checkout and orders,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use storage::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route(
            "/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route(
            "/products/{id}",
            get(routes::products::get::<S>)
                .put(routes::products::update::<S>)
                .delete(routes::products::delete::<S>),
        )
        .route(
            "/categories",
            get(routes::categories::list::<S>).post(routes::categories::create::<S>),
        )
        .route(
            "/categories/{id}",
            get(routes::categories::get::<S>)
                .put(routes::categories::update::<S>)
                .delete(routes::categories::delete::<S>),
        )
        .route("/cart", get(routes::cart::show::<S>))
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route(
            "/cart/items/{id}",
            put(routes::cart::update_item::<S>).delete(routes::cart::remove_item::<S>),
        )
        .route("/cart/clear", axum::routing::delete(routes::cart::clear::<S>))
        .route("/checkout", post(routes::checkout::checkout::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/cancel", put(routes::orders::cancel::<S>))
        .route(
            "/admin/orders/{id}/status",
            put(routes::orders::update_status::<S>),
        )
        .route(
            "/users",
            get(routes::users::list::<S>).post(routes::users::create::<S>),
        )
        .route("/users/{id}", put(routes::users::update::<S>));

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api", api)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a store.
pub fn create_default_state<S: Store + 'static>(store: S, config: &Config) -> Arc<AppState<S>> {
    Arc::new(AppState::new(Arc::new(store), config))
}
