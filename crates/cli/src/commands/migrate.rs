//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! velo-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! Migration files live in `crates/api/migrations/`:
//! ```text
//! migrations/
//! ├── 20260801000001_create_users.sql
//! ├── 20260801000002_create_products.sql
//! └── ...
//! ```

use super::{CliError, connect};

/// Run the API database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
