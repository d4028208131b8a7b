//! Request-scoped extractors.

pub mod auth;

pub use auth::{CurrentUser, RequireAdmin, RequireRider};
