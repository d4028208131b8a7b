//! Admin user-management route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use velocart_core::{Email, Role, UserId};

use super::PageQuery;
use crate::db::users::ProfileUpdate;
use crate::db::{UserRepository, page_count};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::user::User;
use crate::state::AppState;

/// Users per directory page.
const PAGE_SIZE: i64 = 10;

/// Admin user update request body; absent fields are unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
}

/// Paginated user directory response.
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub page: i64,
    pub pages: i64,
    pub total: i64,
}

/// User directory, paginated, newest first.
#[instrument(skip(admin, state))]
pub async fn list(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserPage>> {
    let page = query.page();
    let (users, total) = UserRepository::new(state.pool())
        .list(page, PAGE_SIZE)
        .await?;

    Ok(Json(UserPage {
        users,
        page,
        pages: page_count(total, PAGE_SIZE),
        total,
    }))
}

/// One user by ID.
#[instrument(skip(admin, state))]
pub async fn show(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(Json(user))
}

/// Update a user's identity fields and role.
#[instrument(skip(admin, state, body))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = UserRepository::new(state.pool())
        .update_profile(
            id,
            &ProfileUpdate {
                name: body.name,
                phone: body.phone,
                avatar_url: None,
                role: body.role,
                email,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("User not found".to_owned())
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = %id, admin_id = %admin.id, "user updated");

    Ok(Json(user))
}

/// Delete a user. Admin accounts cannot be deleted.
#[instrument(skip(admin, state))]
pub async fn remove(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<serde_json::Value>> {
    let users = UserRepository::new(state.pool());

    let user = users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    if user.is_admin() {
        return Err(AppError::BadRequest("Cannot delete admin user".to_owned()));
    }

    users.delete(id).await?;

    tracing::info!(user_id = %id, admin_id = %admin.id, "user deleted");

    Ok(Json(json!({ "message": "User removed" })))
}
