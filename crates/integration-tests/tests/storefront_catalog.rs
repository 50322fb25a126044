//! Integration tests for product browsing.

use axum::http::StatusCode;
use riziky_integration_tests::TestClient;
use serde_json::{Value, json};

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .expect("product array")
        .iter()
        .filter_map(|p| p["id"].as_i64())
        .collect()
}

#[tokio::test]
async fn test_listing_returns_whole_catalog() {
    let mut client = TestClient::new();
    let response = client.get("/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], json!(8));
}

#[tokio::test]
async fn test_listing_search_is_case_insensitive() {
    let mut client = TestClient::new();
    let response = client.get("/products?q=CONSOLE").await;
    assert_eq!(ids(&response.body["products"]), vec![8]);
}

#[tokio::test]
async fn test_listing_filters_by_price_range() {
    let mut client = TestClient::new();
    let response = client.get("/products?min_price=200&max_price=300").await;
    let products = response.body["products"].as_array().expect("products");
    assert!(!products.is_empty());
    assert!(products.iter().all(|p| {
        let price = p["price"].as_f64().unwrap_or_default();
        (200.0..=300.0).contains(&price)
    }));

    let response = client.get("/products?min_price=300&max_price=200").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_featured_best_sellers_and_categories() {
    let mut client = TestClient::new();

    let featured = client.get("/products/featured").await.body;
    assert!(
        featured
            .as_array()
            .expect("featured")
            .iter()
            .all(|p| p["featured"] == json!(true))
    );

    let best = client.get("/products/best-sellers").await.body;
    assert_eq!(ids(&best), vec![1, 2, 3, 4]);

    let categories = client.get("/products/categories").await.body;
    assert_eq!(categories[0], json!("Électronique"));
}

#[tokio::test]
async fn test_product_detail() {
    let mut client = TestClient::new();
    let response = client.get("/products/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["product"]["name"], json!("Smartphone Premium"));
    assert_eq!(response.body["display_price"], json!("899.99 €"));
    let related = ids(&response.body["related"]);
    assert!(!related.contains(&1));

    assert_eq!(client.get("/products/999").await.status, StatusCode::NOT_FOUND);
}
