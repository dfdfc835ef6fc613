//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::config::Config;
use api::routes::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use storage::InMemoryStore;
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "admin-secret";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

async fn setup() -> (axum::Router, Arc<AppState<InMemoryStore>>) {
    let state = api::create_default_state(InMemoryStore::new(), &Config::default());
    state
        .users
        .ensure_admin("admin@example.com", ADMIN_TOKEN)
        .await
        .unwrap();
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map(|body| serde_json::to_string(&body).unwrap());
    send_raw(app, method, uri, token, body.as_deref()).await
}

async fn send_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn create_user(app: &axum::Router, name: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/users",
        Some(ADMIN_TOKEN),
        Some(json!({ "name": name, "email": format!("{name}@example.com") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["api_token"].as_str().unwrap().to_string()
}

async fn create_product(app: &axum::Router, name: &str, price: &str, stock: u32) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/products",
        Some(ADMIN_TOKEN),
        Some(json!({ "product_name": name, "price": price, "stock": stock })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["id"].as_str().unwrap().to_string()
}

async fn add_to_cart(app: &axum::Router, token: &str, product_id: &str, quantity: u32) {
    let (status, _) = send(
        app,
        "POST",
        "/api/cart/items",
        Some(token),
        Some(json!({ "product_id": product_id, "quantity": quantity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn checkout(app: &axum::Router, token: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/checkout",
        Some(token),
        Some(json!({ "shipping_address": "7 Elm Street", "payment_type": "Card" })),
    )
    .await
}

async fn stock_of(app: &axum::Router, product_id: &str) -> u64 {
    let (_, json) = send(app, "GET", &format!("/api/products/{product_id}"), None, None).await;
    json["stock"].as_u64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup().await;
    let (status, json) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _) = setup().await;

    let (status, json) = send(&app, "GET", "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["message"].is_string());

    let (status, _) = send(&app, "GET", "/api/cart", Some("wrong"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_checkout_flow() {
    let (app, _) = setup().await;
    let token = create_user(&app, "ann").await;
    let a = create_product(&app, "Teapot", "100.00", 5).await;
    let b = create_product(&app, "Cup", "50.00", 5).await;

    add_to_cart(&app, &token, &a, 2).await;
    add_to_cart(&app, &token, &b, 1).await;

    let (status, json) = checkout(&app, &token).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Order placed successfully!");
    let order_id = json["order_id"].as_str().unwrap().to_string();

    let (status, order) = send(&app, "GET", &format!("/api/orders/{order_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["total_amount"], "250.00");
    assert_eq!(order["order_items"].as_array().unwrap().len(), 2);

    assert_eq!(stock_of(&app, &a).await, 3);
    let (_, cart) = send(&app, "GET", "/api/cart", Some(&token), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    let (status, json) = checkout(&app, &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Cart is empty");
}

#[tokio::test]
async fn test_checkout_insufficient_stock() {
    let (app, _) = setup().await;
    let token = create_user(&app, "ben").await;
    let lamp = create_product(&app, "Lamp", "20.00", 3).await;
    add_to_cart(&app, &token, &lamp, 5).await;

    let (status, json) = checkout(&app, &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Insufficient stock for product: Lamp");
    assert_eq!(stock_of(&app, &lamp).await, 3);

    let (_, cart) = send(&app, "GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_validation() {
    let (app, _) = setup().await;
    let token = create_user(&app, "cat").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/checkout",
        Some(&token),
        Some(json!({ "shipping_address": "", "payment_type": "Card" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "POST",
        "/api/checkout",
        Some(&token),
        Some(json!({ "shipping_address": "1 Road", "payment_type": "IOU" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_cancel_and_admin_status_update() {
    let (app, _) = setup().await;
    let token = create_user(&app, "dan").await;
    let plate = create_product(&app, "Plate", "12.00", 10).await;

    add_to_cart(&app, &token, &plate, 3).await;
    let (_, json) = checkout(&app, &token).await;
    let first = json["order_id"].as_str().unwrap().to_string();

    // Shipped orders cannot be cancelled by the customer.
    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/admin/orders/{first}/status"),
        Some(ADMIN_TOKEN),
        Some(json!({ "status": "Shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Order status updated");
    assert_eq!(json["order"]["status"], "Shipped");

    let (status, json) = send(&app, "PUT", &format!("/api/orders/{first}/cancel"), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Order cannot be cancelled now.");

    // Admin cancel restocks exactly once.
    assert_eq!(stock_of(&app, &plate).await, 7);
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/admin/orders/{first}/status"),
            Some(ADMIN_TOKEN),
            Some(json!({ "status": "Cancelled" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(stock_of(&app, &plate).await, 10);

    // Pending orders can be cancelled by the customer, without restock.
    add_to_cart(&app, &token, &plate, 1).await;
    let (_, json) = checkout(&app, &token).await;
    let second = json["order_id"].as_str().unwrap().to_string();
    let (status, json) = send(&app, "PUT", &format!("/api/orders/{second}/cancel"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"]["status"], "Cancelled");
    assert_eq!(stock_of(&app, &plate).await, 9);
}

#[tokio::test]
async fn test_admin_status_update_error_order() {
    let (app, _) = setup().await;
    let token = create_user(&app, "eve").await;
    let missing = common::OrderId::new();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/admin/orders/{missing}/status"),
        None,
        Some(json!({ "status": "Shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/admin/orders/{missing}/status"),
        Some(&token),
        Some(json!({ "status": "Shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Forbidden: Admins only");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/admin/orders/{missing}/status"),
        Some(ADMIN_TOKEN),
        Some(json!({ "status": "Bogus" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let cup = create_product(&app, "Cup", "3.00", 2).await;
    add_to_cart(&app, &token, &cup, 1).await;
    let (_, json) = checkout(&app, &token).await;
    let order_id = json["order_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/admin/orders/{order_id}/status"),
        Some(ADMIN_TOKEN),
        Some(json!({ "status": "Bogus" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_role_is_checked_before_the_body() {
    let (app, _) = setup().await;
    let token = create_user(&app, "fay").await;
    let missing = common::OrderId::new();
    let status_uri = format!("/api/admin/orders/{missing}/status");

    for body in ["{not json", r#"{"status": 5}"#] {
        let (status, json) = send_raw(&app, "PUT", &status_uri, Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["message"], "Forbidden: Admins only");

        let (status, _) = send_raw(&app, "POST", "/api/products", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send_raw(&app, "PUT", &status_uri, Some(ADMIN_TOKEN), Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (status, _) = send_raw(&app, "PUT", &status_uri, None, Some("{not json")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cup = create_product(&app, "Cup", "3.00", 2).await;
    add_to_cart(&app, &token, &cup, 1).await;
    let (_, json) = checkout(&app, &token).await;
    let order_id = json["order_id"].as_str().unwrap().to_string();

    let (status, _) = send_raw(
        &app,
        "PUT",
        &format!("/api/admin/orders/{order_id}/status"),
        Some(ADMIN_TOKEN),
        Some(r#"{"status": 5}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unstorable_prices_are_rejected() {
    let (app, _) = setup().await;

    for price in ["79228162514264337593543950335", "10000000000.00", "1.999"] {
        let (status, json) = send(
            &app,
            "POST",
            "/api/products",
            Some(ADMIN_TOKEN),
            Some(json!({ "product_name": "Crown", "price": price, "stock": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{price}");
        assert!(json["message"].as_str().unwrap().starts_with("The price"));
    }

    create_product(&app, "Tiara", "9999999999.99", 1).await;
}

#[tokio::test]
async fn test_order_listing_is_scoped() {
    let (app, _) = setup().await;
    let ann = create_user(&app, "ann").await;
    let bob = create_user(&app, "bob").await;
    let mug = create_product(&app, "Mug", "6.00", 50).await;

    for token in [&ann, &bob, &ann] {
        add_to_cart(&app, token, &mug, 1).await;
        let (status, _) = checkout(&app, token).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, anns) = send(&app, "GET", "/api/orders", Some(&ann), None).await;
    assert_eq!(anns.as_array().unwrap().len(), 2);

    let (_, all) = send(&app, "GET", "/api/orders", Some(ADMIN_TOKEN), None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let bobs_order = send(&app, "GET", "/api/orders", Some(&bob), None).await.1[0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let (status, _) = send(&app, "GET", &format!("/api/orders/{bobs_order}"), Some(&ann), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_listing_and_admin_guard() {
    let (app, _) = setup().await;
    let token = create_user(&app, "fay").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/products",
        Some(&token),
        Some(json!({ "product_name": "Nope", "price": "1.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, category) = send(
        &app,
        "POST",
        "/api/categories",
        Some(ADMIN_TOKEN),
        Some(json!({ "name": "Tea Ware" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(category["slug"], "tea-ware");

    let (status, json) = send(
        &app,
        "POST",
        "/api/products",
        Some(ADMIN_TOKEN),
        Some(json!({
            "product_name": "Green Teapot",
            "price": "40.00",
            "discount": "25",
            "stock": 2,
            "category_id": category["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["selling_price"], "30.00");

    create_product(&app, "Spoon", "2.00", 9).await;

    let (status, page) = send(&app, "GET", "/api/products?search=teapot", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["current_page"], 1);

    let (_, page) = send(&app, "GET", "/api/products?category=tea-ware", None, None).await;
    assert_eq!(page["total"], 1);

    let (_, page) = send(&app, "GET", "/api/products?per_page=1&page=2", None, None).await;
    assert_eq!(page["last_page"], 2);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cart_item_management() {
    let (app, _) = setup().await;
    let token = create_user(&app, "gus").await;
    let pen = create_product(&app, "Pen", "1.50", 20).await;

    add_to_cart(&app, &token, &pen, 2).await;
    add_to_cart(&app, &token, &pen, 1).await;

    let (_, cart) = send(&app, "GET", "/api/cart", Some(&token), None).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(cart["total"], "4.50");
    let item_id = items[0]["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/cart/items/{item_id}"),
        Some(&token),
        Some(json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["message"].is_string());

    let (status, _) = send(&app, "DELETE", &format!("/api/cart/items/{item_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(&app, "DELETE", "/api/cart/clear", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 0);
}

#[tokio::test]
async fn test_user_role_toggle() {
    let (app, _) = setup().await;
    let token = create_user(&app, "hal").await;

    let (_, users) = send(&app, "GET", "/api/users", Some(ADMIN_TOKEN), None).await;
    let hal = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "hal@example.com")
        .unwrap();
    assert_eq!(hal["is_admin"], false);
    assert!(hal.get("api_token").is_none());
    let hal_id = hal["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/users/{hal_id}"),
        Some(ADMIN_TOKEN),
        Some(json!({ "is_admin": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_admin"], true);

    let (status, _) = send(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}
