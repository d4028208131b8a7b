//! Auth route handlers: login, Google sign-in, and profile.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use velocart_core::{Email, Role};

use crate::db::UserRepository;
use crate::db::users::ProfileUpdate;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::user::{Address, User};
use crate::state::AppState;

/// Role-scoped login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Google sign-in request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    pub id_token: String,
}

/// Profile update request; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    /// Only honored when the caller is an admin.
    pub role: Option<Role>,
    /// Replaces the saved address list when present.
    pub addresses: Option<Vec<Address>>,
}

/// A user plus a freshly minted session credential.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: User,
    pub addresses: Vec<Address>,
    pub token: String,
}

/// Role-scoped email login.
///
/// Authentication proper is delegated to the identity collaborator; this
/// route only resolves an already-registered (email, role) pair to a session
/// credential, and 401s for anything else.
#[instrument(skip(state))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let email = Email::parse(&body.email).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_email_and_role(&email, body.role)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Email not registered".to_owned()))?;

    let addresses = users.get_addresses(user.id).await?;
    let token = state.tokens().mint(user.id)?;

    Ok(Json(AuthResponse {
        user,
        addresses,
        token,
    }))
}

/// Sign in with a Google identity assertion.
///
/// Verifies the posted ID token, upserts the user it asserts, and mints a
/// session credential.
#[instrument(skip(state, body))]
pub async fn google(
    State(state): State<AppState>,
    Json(body): Json<GoogleAuthRequest>,
) -> Result<Json<AuthResponse>> {
    let identity = state.google().verify(&body.id_token).await?;

    let email = Email::parse(&identity.email)
        .map_err(|e| AppError::Internal(format!("identity asserted an invalid email: {e}")))?;

    let users = UserRepository::new(state.pool());
    let user = users.upsert_from_google(&email, &identity).await?;
    let addresses = users.get_addresses(user.id).await?;
    let token = state.tokens().mint(user.id)?;

    tracing::info!(user_id = %user.id, "google sign-in");

    Ok(Json(AuthResponse {
        user,
        addresses,
        token,
    }))
}

/// Get the caller's profile, with a refreshed session credential.
#[instrument(skip(state, user))]
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<AuthResponse>> {
    let addresses = UserRepository::new(state.pool())
        .get_addresses(user.id)
        .await?;
    let token = state.tokens().mint(user.id)?;

    Ok(Json(AuthResponse {
        user,
        addresses,
        token,
    }))
}

/// Update the caller's profile.
///
/// Role changes are only honored for admin callers; everyone else's `role`
/// field is silently ignored, matching the profile contract.
#[instrument(skip(state, user, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>> {
    let users = UserRepository::new(state.pool());

    let role = if user.is_admin() { body.role } else { None };

    let updated = users
        .update_profile(
            user.id,
            &ProfileUpdate {
                name: body.name,
                phone: body.phone,
                avatar_url: body.avatar_url,
                role,
                email: None,
            },
        )
        .await?;

    if let Some(addresses) = &body.addresses {
        users.replace_addresses(user.id, addresses).await?;
    }

    let addresses = users.get_addresses(user.id).await?;
    let token = state.tokens().mint(updated.id)?;

    Ok(Json(AuthResponse {
        user: updated,
        addresses,
        token,
    }))
}
