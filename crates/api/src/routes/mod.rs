//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (DB ping)
//!
//! # Auth
//! POST /api/auth/login              - Role-scoped email login
//! POST /api/auth/google             - Google identity assertion sign-in
//! GET  /api/auth/profile            - Own profile (protected)
//! PUT  /api/auth/profile            - Update own profile (protected)
//!
//! # Products
//! GET    /api/products              - Filtered catalog listing
//! GET    /api/products/{id}         - Product detail
//! POST   /api/products              - Create product (admin)
//! PUT    /api/products/{id}         - Update product (admin)
//! DELETE /api/products/{id}         - Delete product (admin)
//!
//! # Cart (protected)
//! GET    /api/cart                  - Own cart
//! POST   /api/cart                  - Add item
//! PUT    /api/cart/{productId}      - Set line quantity
//! DELETE /api/cart/{productId}      - Remove line
//! DELETE /api/cart                  - Clear cart
//!
//! # Orders (protected)
//! POST /api/orders                  - Checkout
//! GET  /api/orders/myorders         - Own orders
//! GET  /api/orders/{id}             - One order (owner/rider/admin)
//! PUT  /api/orders/{id}/pay         - Record payment result (owner)
//! GET  /api/orders                  - All orders (admin)
//! PUT  /api/orders/{id}/status      - Status/payment/notes update (admin)
//! GET  /api/orders/rider/orders     - Claimable orders (rider)
//! GET  /api/orders/rider/history    - Delivery history (rider)
//! PUT  /api/orders/rider/{id}/accept   - Claim an order (rider)
//! PUT  /api/orders/rider/{id}/delivery - Advance delivery status (rider)
//!
//! # Riders
//! GET  /api/riders/nearby           - Proximity search (public)
//! GET  /api/riders/me               - Own rider profile (protected)
//! POST /api/riders                  - Create rider profile (protected)
//! PUT  /api/riders/status           - Own availability/status (protected)
//! PUT  /api/riders/location         - Own location (protected)
//! PUT  /api/riders/{id}/documents   - Own documents (protected)
//! PUT  /api/riders/{id}/rating      - Fold in a delivery rating (admin)
//! GET  /api/riders                  - Rider directory (protected)
//! GET  /api/riders/{id}             - One rider (protected)
//!
//! # Users (admin)
//! GET    /api/users                 - User directory
//! GET    /api/users/{id}            - One user
//! PUT    /api/users/{id}            - Update user
//! DELETE /api/users/{id}            - Delete user
//!
//! # Admin
//! GET /api/admin/stats              - Dashboard aggregates
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod riders;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::state::AppState;

/// Query string for paginated listings; pages are 1-based.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

impl PageQuery {
    /// The requested page, defaulting to the first.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/google", post(auth::google))
        .route("/profile", get(auth::profile).put(auth::update_profile))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route(
            "/{product_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list_all))
        .route("/myorders", get(orders::my_orders))
        .route("/rider/orders", get(orders::claimable))
        .route("/rider/history", get(orders::rider_history))
        .route("/rider/{id}/accept", put(orders::accept))
        .route("/rider/{id}/delivery", put(orders::update_delivery))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
        .route("/{id}/pay", put(orders::record_payment))
}

/// Create the rider routes router.
pub fn rider_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(riders::list).post(riders::create))
        .route("/nearby", get(riders::nearby))
        .route("/me", get(riders::me))
        .route("/status", put(riders::update_status))
        .route("/location", put(riders::update_location))
        .route("/{id}/documents", put(riders::update_documents))
        .route("/{id}/rating", put(riders::update_rating))
        .route("/{id}", get(riders::show))
}

/// Create the admin user-management routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", get(users::list)).route(
        "/{id}",
        get(users::show).put(users::update).delete(users::remove),
    )
}

/// Create the admin dashboard routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/stats", get(admin::stats))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/riders", rider_routes())
        .nest("/api/users", user_routes())
        .nest("/api/admin", admin_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults_to_first_page() {
        let q = PageQuery { page: None };
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn test_page_query_clamps_to_one() {
        let q = PageQuery { page: Some(0) };
        assert_eq!(q.page(), 1);
        let q = PageQuery { page: Some(-3) };
        assert_eq!(q.page(), 1);
        let q = PageQuery { page: Some(4) };
        assert_eq!(q.page(), 4);
    }
}
