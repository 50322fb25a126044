//! Integration tests for the session cart.

use axum::http::StatusCode;
use riziky_integration_tests::TestClient;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let mut client = TestClient::new();
    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!("ok"));
}

#[tokio::test]
async fn test_new_visitor_has_empty_cart() {
    let mut client = TestClient::new();
    let response = client.get("/cart").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"], json!([]));
    assert_eq!(response.body["total_items"], json!(0));
    assert_eq!(response.body["summary"]["shipping"], json!(0.0));
}

#[tokio::test]
async fn test_add_merges_quantities_and_persists_across_requests() {
    let mut client = TestClient::new();

    client
        .post("/cart/add", json!({ "product_id": 8, "quantity": 1 }))
        .await;
    client
        .post("/cart/add", json!({ "product_id": 3, "quantity": 2 }))
        .await;
    let response = client
        .post("/cart/add", json!({ "product_id": 8, "quantity": 2 }))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let cart = client.get("/cart").await.body;
    let items = cart["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], json!(8));
    assert_eq!(items[0]["quantity"], json!(3));
    assert_eq!(items[0]["price"], json!(499.99));
    assert_eq!(items[1]["id"], json!(3));
    assert_eq!(cart["total_items"], json!(5));
    assert_eq!(cart["total_price"], json!(1999.95));

    let count = client.get("/cart/count").await.body;
    assert_eq!(count["count"], json!(5));
}

#[tokio::test]
async fn test_update_remove_and_clear() {
    let mut client = TestClient::new();
    client
        .post("/cart/add", json!({ "product_id": 5, "quantity": 1 }))
        .await;
    client
        .post("/cart/add", json!({ "product_id": 4, "quantity": 1 }))
        .await;

    let response = client
        .post("/cart/update", json!({ "product_id": 5, "quantity": 4 }))
        .await;
    assert_eq!(response.body["items"][0]["quantity"], json!(4));

    // Below 1 leaves the line alone.
    let response = client
        .post("/cart/update", json!({ "product_id": 5, "quantity": 0 }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"][0]["quantity"], json!(4));

    let response = client
        .post("/cart/remove", json!({ "product_id": 5 }))
        .await;
    assert_eq!(response.body["items"].as_array().map(Vec::len), Some(1));

    let response = client.post("/cart/clear", json!({})).await;
    assert_eq!(response.body["items"], json!([]));
    assert_eq!(client.get("/cart/count").await.body["count"], json!(0));
}

#[tokio::test]
async fn test_negative_quantities_leave_cart_unchanged() {
    let mut client = TestClient::new();
    client
        .post("/cart/add", json!({ "product_id": 5, "quantity": 2 }))
        .await;

    let response = client
        .post("/cart/update", json!({ "product_id": 5, "quantity": -1 }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"][0]["quantity"], json!(2));

    for quantity in [-3, 0, 5_000_000_000_i64] {
        let response = client
            .post("/cart/add", json!({ "product_id": 5, "quantity": quantity }))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["items"][0]["quantity"], json!(2));
        assert_eq!(response.body["total_items"], json!(2));
    }

    let response = client
        .post("/cart/add", json!({ "product_id": 4, "quantity": -1 }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_unknown_and_out_of_stock_products_are_rejected() {
    let mut client = TestClient::new();

    let response = client
        .post("/cart/add", json!({ "product_id": 999 }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Product 6 is out of stock in the demo catalog.
    let response = client.post("/cart/add", json!({ "product_id": 6 })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(client.get("/cart/count").await.body["count"], json!(0));
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let mut alice = TestClient::new();
    alice
        .post("/cart/add", json!({ "product_id": 1, "quantity": 1 }))
        .await;

    let mut bob = alice.other_visitor();
    assert_eq!(bob.get("/cart/count").await.body["count"], json!(0));
    assert_eq!(alice.get("/cart/count").await.body["count"], json!(1));
}

#[tokio::test]
async fn test_coupons() {
    let mut client = TestClient::new();

    let response = client.post("/cart/coupon", json!({ "code": "  " })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], json!("coupon code is empty"));

    let response = client
        .post("/cart/coupon", json!({ "code": "PROMO20" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], json!("coupon code is not valid"));
}
