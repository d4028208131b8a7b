//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! velo-cli admin create -e admin@example.com -n "Admin Name"
//! ```

use thiserror::Error;

use velocart_core::Email;

use super::{CliError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Shared CLI error (environment, database).
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),
}

impl From<sqlx::Error> for AdminError {
    fn from(e: sqlx::Error) -> Self {
        Self::Cli(CliError::Database(e))
    }
}

/// Create a new admin user.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns an error if the email is invalid, already registered, or the
/// database is unreachable.
pub async fn create_user(email: &str, name: &str) -> Result<i32, AdminError> {
    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    let pool = connect().await?;

    tracing::info!("Creating admin user: {}", email);

    // Check if user already exists
    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(AdminError::UserExists(email.into_inner()));
    }

    // Create the user
    let user_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO users (name, email, role)
        VALUES ($1, $2, 'admin')
        RETURNING id
        ",
    )
    .bind(name)
    .bind(email.as_str())
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user_id,
        email
    );

    Ok(user_id)
}
