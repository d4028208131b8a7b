//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token was provided on a protected route.
    #[error("missing bearer token")]
    MissingToken,

    /// The token failed signature or shape validation.
    #[error("invalid token")]
    InvalidToken,

    /// The token's expiry has passed.
    #[error("token expired")]
    TokenExpired,

    /// The token's subject is not a valid user ID.
    #[error("invalid token subject")]
    InvalidSubject,

    /// The token's user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Token creation failed (signing error).
    #[error("token creation failed: {0}")]
    TokenCreation(String),
}
