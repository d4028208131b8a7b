//! Rider repository: profiles, availability, location, and proximity search.

use sqlx::PgPool;

use velocart_core::{Email, GeoPoint, RiderId, RiderStatus, UserId, VehicleType};

use super::RepositoryError;
use crate::models::rider::{Rider, RiderDocument};

/// A rider joined with identity fields for directory listings.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RiderWithUser {
    #[sqlx(flatten)]
    pub rider: Rider,
    pub user_name: String,
    pub user_email: Email,
    pub user_phone: Option<String>,
}

/// A nearby-search hit: rider, identity, and distance from the query point.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NearbyRider {
    #[sqlx(flatten)]
    pub rider: Rider,
    pub user_name: String,
    pub user_phone: Option<String>,
    pub distance_meters: f64,
}

/// Repository for rider database operations.
pub struct RiderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RiderRepository<'a> {
    /// Create a new rider repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a rider profile by its owning user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Rider>, RepositoryError> {
        let rider = sqlx::query_as::<_, Rider>("SELECT * FROM riders WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(rider)
    }

    /// Get a rider profile with identity fields joined.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_user(
        &self,
        id: RiderId,
    ) -> Result<Option<RiderWithUser>, RepositoryError> {
        let rider = sqlx::query_as::<_, RiderWithUser>(
            r"
            SELECT r.*, u.name AS user_name, u.email AS user_email, u.phone AS user_phone
            FROM riders r
            JOIN users u ON u.id = r.user_id
            WHERE r.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(rider)
    }

    /// All rider profiles with identity joined (admin directory).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<RiderWithUser>, RepositoryError> {
        let riders = sqlx::query_as::<_, RiderWithUser>(
            r"
            SELECT r.*, u.name AS user_name, u.email AS user_email, u.phone AS user_phone
            FROM riders r
            JOIN users u ON u.id = r.user_id
            ORDER BY r.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(riders)
    }

    /// Create a rider profile and promote the owning user to the rider role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a profile.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        vehicle_type: VehicleType,
        vehicle_number: Option<&str>,
        license_number: Option<&str>,
        documents: &[RiderDocument],
    ) -> Result<Rider, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let rider = sqlx::query_as::<_, Rider>(
            r"
            INSERT INTO riders (user_id, vehicle_type, vehicle_number, license_number)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(vehicle_type)
        .bind(vehicle_number)
        .bind(license_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "rider profile already exists for this user"))?;

        for doc in documents {
            sqlx::query(
                r"
                INSERT INTO rider_documents (rider_id, doc_type, url, verified)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(rider.id)
            .bind(&doc.doc_type)
            .bind(&doc.url)
            .bind(doc.verified)
            .execute(&mut *tx)
            .await?;
        }

        // Electing the rider role is part of profile creation
        sqlx::query("UPDATE users SET role = 'rider', updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(rider)
    }

    /// Update the caller's availability and account status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no rider profile.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        user_id: UserId,
        status: Option<RiderStatus>,
        is_available: Option<bool>,
    ) -> Result<Rider, RepositoryError> {
        let rider = sqlx::query_as::<_, Rider>(
            r"
            UPDATE riders
            SET status = COALESCE($2, status),
                is_available = COALESCE($3, is_available),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(status)
        .bind(is_available)
        .fetch_optional(self.pool)
        .await?;

        rider.ok_or(RepositoryError::NotFound)
    }

    /// Update the caller's reported position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no rider profile.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_location(
        &self,
        user_id: UserId,
        location: GeoPoint,
    ) -> Result<Rider, RepositoryError> {
        let rider = sqlx::query_as::<_, Rider>(
            r"
            UPDATE riders
            SET latitude = $2, longitude = $3, updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(location.latitude)
        .bind(location.longitude)
        .fetch_optional(self.pool)
        .await?;

        rider.ok_or(RepositoryError::NotFound)
    }

    /// Replace the caller's document set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no rider profile.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn replace_documents(
        &self,
        user_id: UserId,
        documents: &[RiderDocument],
    ) -> Result<Rider, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let rider =
            sqlx::query_as::<_, Rider>("SELECT * FROM riders WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        sqlx::query("DELETE FROM rider_documents WHERE rider_id = $1")
            .bind(rider.id)
            .execute(&mut *tx)
            .await?;

        for doc in documents {
            sqlx::query(
                r"
                INSERT INTO rider_documents (rider_id, doc_type, url, verified)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(rider.id)
            .bind(&doc.doc_type)
            .bind(&doc.url)
            .bind(doc.verified)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(rider)
    }

    /// Fold a new delivery rating into the running average.
    ///
    /// The average and the delivery count move together in one update, so
    /// concurrent ratings cannot interleave their reads and writes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the rider doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn apply_rating(&self, id: RiderId, rating: f64) -> Result<Rider, RepositoryError> {
        let rider = sqlx::query_as::<_, Rider>(
            r"
            UPDATE riders
            SET rating = (rating * total_deliveries + $2) / (total_deliveries + 1),
                total_deliveries = total_deliveries + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(rating)
        .fetch_optional(self.pool)
        .await?;

        rider.ok_or(RepositoryError::NotFound)
    }

    /// Available, active riders within `max_distance_meters` of a point,
    /// nearest first (Haversine over the stored coordinates).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn nearby(
        &self,
        point: GeoPoint,
        max_distance_meters: f64,
    ) -> Result<Vec<NearbyRider>, RepositoryError> {
        let riders = sqlx::query_as::<_, NearbyRider>(
            r"
            SELECT * FROM (
                SELECT r.*, u.name AS user_name, u.phone AS user_phone,
                       6371000.0 * 2.0 * asin(sqrt(
                           power(sin(radians(($1 - r.latitude) / 2.0)), 2)
                           + cos(radians($1)) * cos(radians(r.latitude))
                             * power(sin(radians(($2 - r.longitude) / 2.0)), 2)
                       )) AS distance_meters
                FROM riders r
                JOIN users u ON u.id = r.user_id
                WHERE r.is_available
                  AND r.status = 'active'
                  AND r.latitude IS NOT NULL
                  AND r.longitude IS NOT NULL
            ) candidates
            WHERE distance_meters <= $3
            ORDER BY distance_meters ASC
            ",
        )
        .bind(point.latitude)
        .bind(point.longitude)
        .bind(max_distance_meters)
        .fetch_all(self.pool)
        .await?;

        Ok(riders)
    }

    /// Number of riders whose account status is active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_active(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM riders WHERE status = 'active'")
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }
}
