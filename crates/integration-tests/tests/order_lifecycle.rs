//! Cart and order lifecycle, driven through the HTTP surface.
//!
//! The marketplace catalog is mocked per test; everything else (sessions,
//! handlers, persistence) is the real stack on an in-memory database.

use axum::http::StatusCode;
use driftwood_integration_tests::{TestApp, read_json};
use httpmock::prelude::*;
use serde_json::json;

/// Mock the marketplace catalog with three known products.
fn mock_catalog(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/products");
        then.status(200).json_body(json!({
            "products": [
                {"productId": 111, "name": "Canvas Tote", "sku": "DW-TOTE-02", "price": 30.0},
                {"productId": 222, "name": "Harbor Candle", "sku": "DW-CNDL-03", "price": 18.5},
                {"productId": 36_400_651, "name": "Driftwood Mug", "sku": "DW-MUG-01", "price": 12.5}
            ],
            "total": 3
        }));
    })
}

async fn order_count(app: &TestApp) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM store_order")
        .fetch_one(app.pool())
        .await
        .expect("Count query succeeds")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let server = MockServer::start();
    let mut app = TestApp::spawn(&server.base_url()).await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_cart_aggregates_repeated_additions() {
    let server = MockServer::start();
    mock_catalog(&server);
    let mut app = TestApp::spawn(&server.base_url()).await;

    let response = app
        .post_json("/cart/items", &json!({"product_id": "111"}))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let item = read_json(response).await;
    assert_eq!(item["product_id"], "111");

    app.post_json("/cart/items", &json!({"product_id": "222"}))
        .await;
    app.post_json("/cart/items", &json!({"product_id": "111"}))
        .await;

    let response = app.get("/cart/items").await;
    assert_eq!(response.status(), StatusCode::OK);

    let lines = read_json(response).await;
    assert_eq!(
        lines,
        json!([
            {"product_id": "111", "name": "Canvas Tote", "quantity": 2},
            {"product_id": "222", "name": "Harbor Candle", "quantity": 1},
        ])
    );
}

#[tokio::test]
async fn test_cart_keeps_products_missing_from_catalog() {
    let server = MockServer::start();
    mock_catalog(&server);
    let mut app = TestApp::spawn(&server.base_url()).await;

    app.post_json("/cart/items", &json!({"product_id": "999"}))
        .await;

    let lines = read_json(app.get("/cart/items").await).await;
    assert_eq!(
        lines,
        json!([{"product_id": "999", "name": null, "quantity": 1}])
    );
}

// ============================================================================
// Local checkout
// ============================================================================

#[tokio::test]
async fn test_place_order_persists_and_clears_cart() {
    let server = MockServer::start();
    mock_catalog(&server);
    let mut app = TestApp::spawn(&server.base_url()).await;

    // Cart contents: A, B, A
    app.post_json("/cart/items", &json!({"product_id": "111"}))
        .await;
    app.post_json("/cart/items", &json!({"product_id": "222"}))
        .await;
    app.post_json("/cart/items", &json!({"product_id": "111"}))
        .await;

    let response = app
        .post_json(
            "/orders",
            &json!({
                "product_ids": ["111", "111", "222"],
                "shipping_info": {"name": "Harper Quinn", "city": "Austin"},
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "success");
    assert!(body["order_id"].is_string());

    // The cart is emptied by the same transaction that wrote the order.
    let lines = read_json(app.get("/cart/items").await).await;
    assert_eq!(lines, json!([]));

    assert_eq!(order_count(&app).await, 1);

    let stored: (String, String) =
        sqlx::query_as("SELECT product_ids, shipping_info FROM store_order")
            .fetch_one(app.pool())
            .await
            .expect("Order row exists");
    assert_eq!(stored.0, "111,111,222");
    assert!(stored.1.contains("Harper Quinn"));
}

#[tokio::test]
async fn test_place_order_rejects_empty_product_list() {
    let server = MockServer::start();
    let mut app = TestApp::spawn(&server.base_url()).await;

    let response = app
        .post_json("/orders", &json!({"product_ids": []}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "product_ids must not be empty");
    assert_eq!(order_count(&app).await, 0);
}

// ============================================================================
// Chaos orders
// ============================================================================

#[tokio::test]
async fn test_chaos_order_places_randomized_basket() {
    let server = MockServer::start();
    mock_catalog(&server);
    let mut app = TestApp::spawn(&server.base_url()).await;

    let response = app.post("/orders/chaos").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Order placed successfully!");
    assert_eq!(order_count(&app).await, 1);

    let stored: (String, String) =
        sqlx::query_as("SELECT product_ids, shipping_info FROM store_order")
            .fetch_one(app.pool())
            .await
            .expect("Order row exists");

    // Every product comes from the catalog plus the guaranteed ride-along.
    let known = ["111", "222", "36400651"];
    for id in stored.0.split(',') {
        assert!(known.contains(&id), "unexpected product {id}");
    }
    assert!(stored.0.contains("36400651"));

    // The shipping document comes from a bundled persona.
    assert!(stored.1.contains("name"));
}

#[tokio::test]
async fn test_chaos_order_is_rate_limited_per_session() {
    let server = MockServer::start();
    mock_catalog(&server);
    let mut app = TestApp::spawn(&server.base_url()).await;

    let response = app.post("/orders/chaos").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.post("/orders/chaos").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = read_json(response).await;
    assert_eq!(
        body["message"],
        "Rate limiting # of orders that can be generated. Is someone else also running this?"
    );
    assert_eq!(order_count(&app).await, 1);
}

#[tokio::test]
async fn test_chaos_order_with_empty_catalog_places_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/products");
        then.status(200).json_body(json!({"products": [], "total": 0}));
    });
    let mut app = TestApp::spawn(&server.base_url()).await;

    let response = app.post("/orders/chaos").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Order placed successfully!");
    assert_eq!(order_count(&app).await, 0);
}
