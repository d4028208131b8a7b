//! Authentication extractors.
//!
//! The authenticated caller is an explicit, request-scoped value: handlers
//! declare [`CurrentUser`] (or a role-gated wrapper) as a parameter and the
//! extractor resolves the bearer token to a database user. There is no
//! ambient auth state.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::user::User;
use crate::services::auth::AuthError;
use crate::state::AppState;
use velocart_core::Role;

/// Extractor that requires an authenticated user.
///
/// Verifies the `Authorization: Bearer <token>` header and loads the user it
/// was minted for. Rejects with 401 if the token is missing, invalid,
/// expired, or refers to a deleted account.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     Json(user)
/// }
/// ```
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;

        let user_id = state.tokens().verify(token)?;

        let user = UserRepository::new(state.pool())
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Associate subsequent errors on this request with the caller
        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self(user))
    }
}

/// Extractor that requires an authenticated admin.
///
/// Builds on [`CurrentUser`] and rejects non-admin callers with 403.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            return Err(AppError::Forbidden(
                "Not authorized as an admin".to_owned(),
            ));
        }

        Ok(Self(user))
    }
}

/// Extractor that requires an authenticated rider.
///
/// Builds on [`CurrentUser`] and rejects non-rider callers with 403.
pub struct RequireRider(pub User);

impl FromRequestParts<AppState> for RequireRider {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role != Role::Rider {
            return Err(AppError::Forbidden("Not authorized as a rider".to_owned()));
        }

        Ok(Self(user))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/auth/profile");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).expect("valid request").into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_present() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_empty_value() {
        let parts = parts_with_auth(Some("Bearer "));
        assert_eq!(bearer_token(&parts), None);
    }
}
