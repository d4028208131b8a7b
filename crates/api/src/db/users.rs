//! User repository for database operations.

use sqlx::PgPool;

use velocart_core::{Email, Role, UserId};

use super::{RepositoryError, page_offset};
use crate::models::user::{Address, User};
use crate::services::google::GoogleIdentity;

/// Fields accepted by a profile update. `None` leaves a field unchanged.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    /// Only honored for admin callers; see the auth routes.
    pub role: Option<Role>,
    /// Only settable through the admin user-management routes.
    pub email: Option<Email>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Get a user by email and role, for role-scoped login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email_and_role(
        &self,
        email: &Email,
        role: Role,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND role = $2")
            .bind(email)
            .bind(role)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        role: Role,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (name, email, role)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(name)
        .bind(email)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email already exists"))
    }

    /// Upsert a user from a verified Google identity assertion.
    ///
    /// Creates the account on first sign-in; afterwards refreshes the stored
    /// Google UID and avatar. The role is never touched by this path.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_from_google(
        &self,
        email: &Email,
        identity: &GoogleIdentity,
    ) -> Result<User, RepositoryError> {
        let name = identity
            .name
            .clone()
            .unwrap_or_else(|| email.local_part().to_owned());

        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (name, email, role, avatar_url, google_uid)
            VALUES ($1, $2, 'customer', $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET google_uid = EXCLUDED.google_uid,
                avatar_url = COALESCE(EXCLUDED.avatar_url, users.avatar_url),
                updated_at = NOW()
            RETURNING *
            ",
        )
        .bind(&name)
        .bind(email)
        .bind(&identity.picture)
        .bind(&identity.uid)
        .fetch_one(self.pool)
        .await?;

        Ok(user)
    }

    /// Update a user's profile fields; unset fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                avatar_url = COALESCE($4, avatar_url),
                role = COALESCE($5, role),
                email = COALESCE($6, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.avatar_url)
        .bind(update.role)
        .bind(&update.email)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email already exists"))?;

        user.ok_or(RepositoryError::NotFound)
    }

    /// List users, paginated, newest first (admin directory).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<User>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page_size)
        .bind(page_offset(page, page_size))
        .fetch_all(self.pool)
        .await?;

        Ok((users, total))
    }

    /// Delete a user.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a user's saved addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_addresses(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(
            r"
            SELECT id, street, city, state, zip_code, country, is_default
            FROM addresses
            WHERE user_id = $1
            ORDER BY is_default DESC, id ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(addresses)
    }

    /// Replace a user's saved addresses with the given set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn replace_addresses(
        &self,
        user_id: UserId,
        addresses: &[Address],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM addresses WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for address in addresses {
            sqlx::query(
                r"
                INSERT INTO addresses (user_id, street, city, state, zip_code, country, is_default)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(user_id)
            .bind(&address.street)
            .bind(&address.city)
            .bind(&address.state)
            .bind(&address.zip_code)
            .bind(&address.country)
            .bind(address.is_default)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
