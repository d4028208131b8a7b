//! Integration tests for the product catalog routes.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API running (cargo run -p velocart-api)
//! - The fixture catalog seeded (velo-cli seed products)
//!
//! Run with: cargo test -p velocart-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use velocart_integration_tests::{admin_email, base_url, client, login};

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_list_envelope_and_page_size() {
    let client = client();
    let resp = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("not JSON");

    let products = body["products"].as_array().expect("products array");
    assert!(products.len() <= 8, "page size is 8");
    assert_eq!(body["page"], 1);
    assert!(body["pages"].as_i64().is_some());
    assert!(body["total"].as_i64().is_some());
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_list_category_filter() {
    let client = client();
    let resp = client
        .get(format!("{}/api/products?category=Fan", base_url()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("not JSON");

    let products = body["products"].as_array().expect("products array");
    assert!(!products.is_empty(), "fixture catalog has fans");
    for product in products {
        assert_eq!(product["category"], "Fan");
    }
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_list_price_range_and_keyword() {
    let client = client();
    let resp = client
        .get(format!(
            "{}/api/products?minPrice=40&maxPrice=60&keyword=fan",
            base_url()
        ))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("not JSON");

    for product in body["products"].as_array().expect("products array") {
        let price: f64 = product["price"]
            .as_str()
            .expect("price is a decimal string")
            .parse()
            .expect("price parses");
        assert!((40.0..=60.0).contains(&price));
    }
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_detail_and_missing_product() {
    let client = client();

    let listing: Value = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    let first = &listing["products"][0];
    let id = first["id"].as_i64().expect("product id");

    let detail = client
        .get(format!("{}/api/products/{id}", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(detail.status(), StatusCode::OK);
    let product: Value = detail.json().await.expect("not JSON");
    assert_eq!(product["id"], first["id"]);
    assert!(product["slug"].as_str().is_some());

    let missing = client
        .get(format!("{}/api/products/99999999", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_create_requires_admin() {
    let client = client();

    let body = serde_json::json!({
        "name": "Unauthorized Test Product",
        "description": "Should never be created",
        "brand": "Test",
        "category": "Test",
        "price": "1.00",
        "gender": "unisex"
    });

    // No token at all
    let resp = client
        .post(format!("{}/api/products", base_url()))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_admin_crud_roundtrip() {
    let client = client();
    let token = login(&client, &admin_email(), "admin").await;

    // Create: slug is derived from the name
    let created: Value = client
        .post(format!("{}/api/products", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Integration Test Lamp",
            "description": "Created by the integration suite",
            "brand": "TestBrand",
            "category": "Lighting",
            "price": "10.00",
            "countInStock": 3,
            "gender": "unisex"
        }))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    assert_eq!(created["slug"], "integration-test-lamp");
    let id = created["id"].as_i64().expect("product id");

    // Update price only; other fields unchanged
    let updated: Value = client
        .put(format!("{}/api/products/{id}", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "price": "12.50" }))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    assert_eq!(updated["price"], "12.50");
    assert_eq!(updated["name"], "Integration Test Lamp");

    // Delete, then the detail route 404s
    let deleted = client
        .delete(format!("{}/api/products/{id}", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = client
        .get(format!("{}/api/products/{id}", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}
