//! Rider directory route handlers.
//!
//! A rider's availability, status, and location are mutable only through
//! the caller's own profile; there is no route that moves someone else's
//! pin on the map.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use velocart_core::{GeoPoint, RiderId, RiderStatus, VehicleType};

use crate::db::RiderRepository;
use crate::db::riders::{NearbyRider, RiderWithUser};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::rider::{Rider, RiderDocument};
use crate::models::user::UserSummary;
use crate::state::AppState;

/// Default proximity search radius in meters.
const DEFAULT_NEARBY_METERS: f64 = 5_000.0;

/// Create-rider-profile request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRiderRequest {
    pub vehicle_type: VehicleType,
    pub vehicle_number: Option<String>,
    pub license_number: Option<String>,
    #[serde(default)]
    pub documents: Vec<RiderDocument>,
}

/// Availability/status update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRiderStatusRequest {
    pub status: Option<RiderStatus>,
    pub is_available: Option<bool>,
}

/// Location update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// Document replacement request body.
#[derive(Debug, Deserialize)]
pub struct UpdateDocumentsRequest {
    pub documents: Vec<RiderDocument>,
}

/// Delivery rating request body.
#[derive(Debug, Deserialize)]
pub struct UpdateRatingRequest {
    pub rating: f64,
}

/// Proximity search query string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub max_distance: Option<f64>,
}

/// A rider profile as served to clients, identity joined, documents
/// excluded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderView {
    #[serde(flatten)]
    pub rider: Rider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_location: Option<GeoPoint>,
    pub user: UserSummary,
}

impl From<RiderWithUser> for RiderView {
    fn from(row: RiderWithUser) -> Self {
        let user = UserSummary {
            id: row.rider.user_id,
            name: row.user_name,
            email: Some(row.user_email),
            phone: row.user_phone,
        };
        let current_location = row.rider.location();

        Self {
            rider: row.rider,
            current_location,
            user,
        }
    }
}

/// A proximity search hit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRiderView {
    pub id: RiderId,
    pub vehicle_type: VehicleType,
    pub rating: f64,
    pub current_location: GeoPoint,
    pub distance_meters: f64,
    pub user: NearbyUserView,
}

/// The identity fields exposed on a proximity hit.
#[derive(Debug, Serialize)]
pub struct NearbyUserView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl NearbyRiderView {
    fn from_row(row: NearbyRider) -> Option<Self> {
        // Search candidates always have coordinates; a missing pair means
        // the row changed underneath us, so drop it rather than fake one.
        let current_location = row.rider.location()?;

        Some(Self {
            id: row.rider.id,
            vehicle_type: row.rider.vehicle_type,
            rating: row.rider.rating,
            current_location,
            distance_meters: row.distance_meters,
            user: NearbyUserView {
                name: row.user_name,
                phone: row.user_phone,
            },
        })
    }
}

/// Available, active riders near a point (public).
#[instrument(skip(state))]
pub async fn nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<NearbyRiderView>>> {
    let point = GeoPoint::new(query.latitude, query.longitude)
        .ok_or_else(|| AppError::BadRequest("invalid coordinates".to_owned()))?;

    let max_distance = query.max_distance.unwrap_or(DEFAULT_NEARBY_METERS);
    if !max_distance.is_finite() || max_distance <= 0.0 {
        return Err(AppError::BadRequest("invalid maxDistance".to_owned()));
    }

    let riders = RiderRepository::new(state.pool())
        .nearby(point, max_distance)
        .await?;

    Ok(Json(
        riders
            .into_iter()
            .filter_map(NearbyRiderView::from_row)
            .collect(),
    ))
}

/// The caller's rider profile.
#[instrument(skip(state, user))]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<RiderView>> {
    let rider = RiderRepository::new(state.pool())
        .get_by_user(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Rider profile not found".to_owned()))?;

    let current_location = rider.location();

    Ok(Json(RiderView {
        rider,
        current_location,
        user: UserSummary {
            id: user.id,
            name: user.name,
            email: Some(user.email),
            phone: user.phone,
        },
    }))
}

/// Create the caller's rider profile.
///
/// One profile per user; creating it promotes the account's role to rider.
#[instrument(skip(state, user, body))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateRiderRequest>,
) -> Result<(StatusCode, Json<Rider>)> {
    let rider = RiderRepository::new(state.pool())
        .create(
            user.id,
            body.vehicle_type,
            body.vehicle_number.as_deref(),
            body.license_number.as_deref(),
            &body.documents,
        )
        .await?;

    tracing::info!(rider_id = %rider.id, user_id = %user.id, "rider profile created");

    Ok((StatusCode::CREATED, Json(rider)))
}

/// Update the caller's availability and account status.
#[instrument(skip(state, user, body))]
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UpdateRiderStatusRequest>,
) -> Result<Json<Rider>> {
    let rider = RiderRepository::new(state.pool())
        .update_status(user.id, body.status, body.is_available)
        .await
        .map_err(not_found_as_profile)?;

    Ok(Json(rider))
}

/// Update the caller's reported location.
#[instrument(skip(state, user, body))]
pub async fn update_location(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UpdateLocationRequest>,
) -> Result<Json<Rider>> {
    let point = GeoPoint::new(body.latitude, body.longitude)
        .ok_or_else(|| AppError::BadRequest("invalid coordinates".to_owned()))?;

    let rider = RiderRepository::new(state.pool())
        .update_location(user.id, point)
        .await
        .map_err(not_found_as_profile)?;

    Ok(Json(rider))
}

/// Replace the caller's document set.
///
/// The path carries a rider ID for wire compatibility, but only the
/// caller's own profile is ever touched.
#[instrument(skip(state, user, body))]
pub async fn update_documents(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(_id): Path<RiderId>,
    Json(body): Json<UpdateDocumentsRequest>,
) -> Result<Json<Rider>> {
    let rider = RiderRepository::new(state.pool())
        .replace_documents(user.id, &body.documents)
        .await
        .map_err(not_found_as_profile)?;

    Ok(Json(rider))
}

/// Fold a delivery rating into a rider's running average (admin).
#[instrument(skip(admin, state))]
pub async fn update_rating(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<RiderId>,
    Json(body): Json<UpdateRatingRequest>,
) -> Result<Json<Rider>> {
    if !(0.0..=5.0).contains(&body.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 0 and 5".to_owned(),
        ));
    }

    let rider = RiderRepository::new(state.pool())
        .apply_rating(id, body.rating)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Rider not found".to_owned())
            }
            other => other.into(),
        })?;

    Ok(Json(rider))
}

/// Rider directory, newest first.
#[instrument(skip(state, _user))]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<RiderView>>> {
    let riders = RiderRepository::new(state.pool()).list().await?;

    Ok(Json(riders.into_iter().map(RiderView::from).collect()))
}

/// One rider profile by ID.
#[instrument(skip(state, _user))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<RiderId>,
) -> Result<Json<RiderView>> {
    let rider = RiderRepository::new(state.pool())
        .get_with_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Rider not found".to_owned()))?;

    Ok(Json(RiderView::from(rider)))
}

/// Map a repository `NotFound` onto the rider-profile message.
fn not_found_as_profile(e: crate::db::RepositoryError) -> AppError {
    match e {
        crate::db::RepositoryError::NotFound => {
            AppError::NotFound("Rider profile not found".to_owned())
        }
        other => other.into(),
    }
}
