//! Integration tests for Velocart.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p velocart-cli -- migrate
//! cargo run -p velocart-cli -- seed products -f crates/cli/fixtures/products.yaml
//!
//! # Start the API
//! cargo run -p velocart-api
//!
//! # Run the (ignored-by-default) live tests
//! cargo test -p velocart-integration-tests -- --ignored
//! ```
//!
//! The tests expect seeded accounts for the three roles; set
//! `TEST_CUSTOMER_EMAIL`, `TEST_ADMIN_EMAIL`, and `TEST_RIDER_EMAIL` to
//! override the defaults.

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5001".to_string())
}

/// Build a plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

/// Log in via `POST /api/auth/login` and return the session credential.
///
/// # Panics
///
/// Panics if the login request fails or returns no token; the seeded test
/// accounts must exist for the live tests to run.
pub async fn login(client: &Client, email: &str, role: &str) -> String {
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "role": role }))
        .send()
        .await
        .expect("login request failed");

    assert!(
        resp.status().is_success(),
        "login failed for {email} ({role}): {}",
        resp.status()
    );

    let body: Value = resp.json().await.expect("login response not JSON");
    body["token"]
        .as_str()
        .expect("login response has no token")
        .to_string()
}

/// The seeded customer account email.
#[must_use]
pub fn customer_email() -> String {
    std::env::var("TEST_CUSTOMER_EMAIL").unwrap_or_else(|_| "customer@example.com".to_string())
}

/// The seeded admin account email.
#[must_use]
pub fn admin_email() -> String {
    std::env::var("TEST_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string())
}

/// The seeded rider account email.
#[must_use]
pub fn rider_email() -> String {
    std::env::var("TEST_RIDER_EMAIL").unwrap_or_else(|_| "rider@example.com".to_string())
}
