//! Database operations for the Velocart `PostgreSQL` database.
//!
//! # Tables
//!
//! - `users` / `addresses` - accounts and saved shipping addresses
//! - `products` - catalog
//! - `carts` / `cart_items` - one active cart per user
//! - `orders` / `order_items` - orders with snapshot line items
//! - `riders` / `rider_documents` - rider profiles
//!
//! Queries use runtime `query_as` with `FromRow` models, so the workspace
//! builds without a live database.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p velocart-cli -- migrate
//! ```

pub mod carts;
pub mod orders;
pub mod products;
pub mod riders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use riders::RiderRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A line item asked for more stock than the product has.
    #[error("insufficient stock for {0}")]
    OutOfStock(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, everything else to
    /// `Database`.
    fn from_sqlx(e: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Compute the number of pages for a paginated listing.
#[must_use]
pub fn page_count(total: i64, page_size: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + page_size - 1) / page_size
    }
}

/// Convert a 1-based page number into a row offset, clamping page to 1.
#[must_use]
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (page.max(1) - 1) * page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(25, 8), 4);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(2, 10), 10);
        assert_eq!(page_offset(3, 8), 16);
        // Page 0 and negative pages clamp to the first page
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(-5, 10), 0);
    }
}
