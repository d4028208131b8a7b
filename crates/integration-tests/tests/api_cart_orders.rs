//! Integration tests for the cart and checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API running (cargo run -p velocart-api)
//! - Seeded customer/admin accounts and the fixture catalog
//!
//! Run with: cargo test -p velocart-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use velocart_integration_tests::{base_url, client, customer_email, login};

/// Fetch a product with stock to test against.
async fn some_product(client: &Client) -> Value {
    let listing: Value = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    listing["products"]
        .as_array()
        .expect("products array")
        .iter()
        .find(|p| p["countInStock"].as_i64().unwrap_or(0) >= 5)
        .expect("a product with stock")
        .clone()
}

/// Empty the caller's cart so quantity assertions start from zero.
async fn reset_cart(client: &Client, token: &str) {
    let resp = client
        .delete(format!("{}/api/cart", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("request failed");
    assert!(resp.status().is_success());
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_cart_requires_auth() {
    let client = client();
    let resp = client
        .get(format!("{}/api/cart", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_empty_cart_shape() {
    let client = client();
    let token = login(&client, &customer_email(), "customer").await;
    reset_cart(&client, &token).await;

    let cart: Value = client
        .get(format!("{}/api/cart", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    assert_eq!(cart["items"].as_array().expect("items").len(), 0);
    assert_eq!(cart["total"], "0");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_add_to_cart_accumulates_quantity() {
    let client = client();
    let token = login(&client, &customer_email(), "customer").await;
    reset_cart(&client, &token).await;

    let product = some_product(&client).await;
    let product_id = product["id"].as_i64().expect("id");

    // First add: one line, quantity 2, line total = 2 * price
    let cart: Value = client
        .post(format!("{}/api/cart", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "productId": product_id, "quantity": 2 }))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    let items = cart["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);

    // Second add of the same product increments the existing line
    let cart: Value = client
        .post(format!("{}/api/cart", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "productId": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    let items = cart["items"].as_array().expect("items");
    assert_eq!(items.len(), 1, "still one line");
    assert_eq!(items[0]["quantity"], 3, "2 + 1");

    reset_cart(&client, &token).await;
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_cart_quantity_zero_removes_line() {
    let client = client();
    let token = login(&client, &customer_email(), "customer").await;
    reset_cart(&client, &token).await;

    let product = some_product(&client).await;
    let product_id = product["id"].as_i64().expect("id");

    client
        .post(format!("{}/api/cart", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "productId": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("request failed");

    let cart: Value = client
        .put(format!("{}/api/cart/{product_id}", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    assert_eq!(cart["items"].as_array().expect("items").len(), 0);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_cart_add_unknown_product_404s() {
    let client = client();
    let token = login(&client, &customer_email(), "customer").await;

    let resp = client
        .post(format!("{}/api/cart", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "productId": 99_999_999, "quantity": 1 }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_checkout_empty_order_rejected() {
    let client = client();
    let token = login(&client, &customer_email(), "customer").await;

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "orderItems": [],
            "shippingAddress": {
                "address": "1 Main St", "city": "Dhaka",
                "zipCode": "1212", "country": "BD"
            },
            "paymentMethod": "credit_card",
            "totalPrice": "0"
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_checkout_rejects_wrong_total() {
    let client = client();
    let token = login(&client, &customer_email(), "customer").await;
    let product = some_product(&client).await;

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "orderItems": [{ "product": product["id"], "qty": 1 }],
            "shippingAddress": {
                "address": "1 Main St", "city": "Dhaka",
                "zipCode": "1212", "country": "BD"
            },
            "paymentMethod": "credit_card",
            "totalPrice": "0.01"
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("not JSON");
    assert!(
        body["message"]
            .as_str()
            .expect("message")
            .contains("total mismatch")
    );
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_checkout_creates_pending_order_with_server_total() {
    let client = client();
    let token = login(&client, &customer_email(), "customer").await;
    let product = some_product(&client).await;

    let price: f64 = product["price"]
        .as_str()
        .expect("price string")
        .parse()
        .expect("price parses");
    let total = format!("{:.2}", price * 2.0);

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "orderItems": [{ "product": product["id"], "qty": 2 }],
            "shippingAddress": {
                "address": "1 Main St", "city": "Dhaka",
                "zipCode": "1212", "country": "BD"
            },
            "paymentMethod": "credit_card",
            "totalPrice": total
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("not JSON");

    assert_eq!(order["status"], "pending");
    assert_eq!(order["paymentStatus"], "pending");
    assert_eq!(order["totalPrice"], total.as_str());
    assert_eq!(order["orderItems"].as_array().expect("items").len(), 1);
    assert_eq!(order["orderItems"][0]["qty"], 2);
    assert!(
        order["trackingNumber"]
            .as_str()
            .expect("tracking number")
            .starts_with("VC-")
    );

    // The order shows up in the caller's history, newest first
    let mine: Value = client
        .get(format!("{}/api/orders/myorders", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    assert_eq!(mine["orders"][0]["id"], order["id"]);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_order_fetch_denied_for_stranger() {
    let client = client();
    let owner_token = login(&client, &customer_email(), "customer").await;
    let product = some_product(&client).await;

    let price: f64 = product["price"]
        .as_str()
        .expect("price string")
        .parse()
        .expect("price parses");

    let order: Value = client
        .post(format!("{}/api/orders", base_url()))
        .bearer_auth(&owner_token)
        .json(&json!({
            "orderItems": [{ "product": product["id"], "qty": 1 }],
            "shippingAddress": {
                "address": "1 Main St", "city": "Dhaka",
                "zipCode": "1212", "country": "BD"
            },
            "paymentMethod": "credit_card",
            "totalPrice": format!("{price:.2}")
        }))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("not JSON");

    // A second customer who is neither owner, rider, nor admin is denied
    let stranger = std::env::var("TEST_SECOND_CUSTOMER_EMAIL")
        .unwrap_or_else(|_| "customer2@example.com".to_string());
    let stranger_token = login(&client, &stranger, "customer").await;

    let resp = client
        .get(format!("{}/api/orders/{}", base_url(), order["id"]))
        .bearer_auth(&stranger_token)
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
