//! Cart repository: one active cart per user, created lazily.

use rust_decimal::Decimal;
use sqlx::PgPool;

use velocart_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartItem;

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the line items of a user's cart, oldest line first.
    ///
    /// A user with no cart row simply has no items; callers render that as
    /// the empty cart shape.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(
            r"
            SELECT ci.cart_id, ci.product_id, ci.quantity, ci.price
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            WHERE c.user_id = $1
            ORDER BY ci.added_at ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Add `quantity` of a product to the user's cart, capturing `unit_price`.
    ///
    /// Creates the cart on first use. If the product is already a line item,
    /// its quantity is incremented and the original price snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Lazily create the cart; ON CONFLICT keeps this idempotent
        let cart_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO carts (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id
            ",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO cart_items (cart_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Set the quantity of an existing line item.
    ///
    /// A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = if quantity == 0 {
            sqlx::query(
                r"
                DELETE FROM cart_items ci
                USING carts c
                WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.product_id = $2
                ",
            )
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?
        } else {
            sqlx::query(
                r"
                UPDATE cart_items ci
                SET quantity = $3
                FROM carts c
                WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.product_id = $2
                ",
            )
            .bind(user_id)
            .bind(product_id)
            .bind(quantity)
            .execute(self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove a line item. Idempotent: removing an absent item is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM cart_items ci
            USING carts c
            WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.product_id = $2
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Empty the user's cart. The cart row itself persists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM cart_items ci
            USING carts c
            WHERE ci.cart_id = c.id AND c.user_id = $1
            ",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
