//! Order repository.
//!
//! Orders are never deleted, only status-mutated. Every status write goes
//! through a conditional `UPDATE ... WHERE status = <expected>` so a
//! concurrent change loses cleanly instead of being silently overwritten,
//! and rider assignment is a single conditional update that can only
//! succeed once per order.

use rust_decimal::Decimal;
use sqlx::PgPool;

use velocart_core::{Email, OrderId, OrderStatus, PaymentMethod, PaymentStatus, UserId};

use super::{RepositoryError, page_offset};
use crate::models::order::{Order, OrderItem, PaymentResult, ShippingAddress};

/// Minutes between acceptance and the stamped delivery estimate.
const DELIVERY_ESTIMATE_MINUTES: i32 = 30;

/// Validated input for creating an order.
#[derive(Debug)]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub shipping: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    pub tracking_number: String,
}

/// A validated order line: snapshot fields copied from the product.
#[derive(Debug)]
pub struct NewOrderItem {
    pub product_id: velocart_core::ProductId,
    pub name: String,
    pub qty: i32,
    pub image: String,
    pub price: Decimal,
}

/// An order joined with the identities order listings embed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderWithParties {
    #[sqlx(flatten)]
    pub order: Order,
    pub user_name: String,
    pub user_email: Email,
    pub rider_name: Option<String>,
    pub rider_email: Option<Email>,
}

/// Aggregates backing the admin dashboard.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderStats {
    pub total_orders: i64,
    /// Sum of delivered order totals.
    pub total_earnings: Decimal,
    pub orders_last_30_days: i64,
    pub orders_previous_30_days: i64,
}

/// Shared SELECT for order rows with user and rider identity joined in.
const SELECT_WITH_PARTIES: &str = r"
    SELECT o.*,
           u.name AS user_name, u.email AS user_email,
           r.name AS rider_name, r.email AS rider_email
    FROM orders o
    JOIN users u ON u.id = o.user_id
    LEFT JOIN users r ON r.id = o.rider_id
";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order from validated line items, decrementing stock.
    ///
    /// Runs in one transaction: each line decrements its product's stock
    /// with a `count_in_stock >= qty` guard, so a concurrent checkout of the
    /// last unit fails here instead of overselling.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::OutOfStock` if any product is missing or
    /// short on stock. Returns `RepositoryError::Database` for other errors.
    pub async fn create(
        &self,
        user_id: UserId,
        new: &NewOrder,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for item in &new.items {
            let result = sqlx::query(
                r"
                UPDATE products
                SET count_in_stock = count_in_stock - $2, updated_at = NOW()
                WHERE id = $1 AND count_in_stock >= $2
                ",
            )
            .bind(item.product_id)
            .bind(item.qty)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::OutOfStock(item.name.clone()));
            }
        }

        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO orders
                (user_id, status, payment_method, payment_status,
                 ship_address, ship_city, ship_postal_code, ship_country,
                 items_price, tax_price, shipping_price, total_price,
                 tracking_number, notes)
            VALUES ($1, 'pending', $2, 'pending', $3, $4, $5, $6, $7, $8, $9, $10, $11, '')
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(new.payment_method)
        .bind(&new.shipping.address)
        .bind(&new.shipping.city)
        .bind(&new.shipping.postal_code)
        .bind(&new.shipping.country)
        .bind(new.items_price)
        .bind(new.tax_price)
        .bind(new.shipping_price)
        .bind(new.total_price)
        .bind(&new.tracking_number)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(new.items.len());
        for item in &new.items {
            let inserted = sqlx::query_as::<_, OrderItem>(
                r"
                INSERT INTO order_items (order_id, product_id, name, qty, image, price)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING order_id, product_id, name, qty, image, price
                ",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(item.qty)
            .bind(&item.image)
            .bind(item.price)
            .fetch_one(&mut *tx)
            .await?;

            items.push(inserted);
        }

        tx.commit().await?;

        Ok((order, items))
    }

    /// Get one order with parties joined.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderWithParties>, RepositoryError> {
        let order = sqlx::query_as::<_, OrderWithParties>(&format!(
            "{SELECT_WITH_PARTIES} WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Line items for a set of orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for(&self, ids: &[OrderId]) -> Result<Vec<OrderItem>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT order_id, product_id, name, qty, image, price
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY id ASC
            ",
        )
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// A user's orders, paginated, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<OrderWithParties>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        let orders = sqlx::query_as::<_, OrderWithParties>(&format!(
            "{SELECT_WITH_PARTIES} WHERE o.user_id = $1 ORDER BY o.created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(page_size)
        .bind(page_offset(page, page_size))
        .fetch_all(self.pool)
        .await?;

        Ok((orders, total))
    }

    /// All orders, paginated, newest first (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<OrderWithParties>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        let orders = sqlx::query_as::<_, OrderWithParties>(&format!(
            "{SELECT_WITH_PARTIES} ORDER BY o.created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page_size)
        .bind(page_offset(page, page_size))
        .fetch_all(self.pool)
        .await?;

        Ok((orders, total))
    }

    /// Orders a rider can claim: unassigned, in a claimable status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_claimable(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<OrderWithParties>, i64), RepositoryError> {
        let statuses: Vec<String> = OrderStatus::CLAIMABLE
            .iter()
            .map(ToString::to_string)
            .collect();

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE rider_id IS NULL AND status = ANY($1)",
        )
        .bind(&statuses)
        .fetch_one(self.pool)
        .await?;

        let orders = sqlx::query_as::<_, OrderWithParties>(&format!(
            "{SELECT_WITH_PARTIES} WHERE o.rider_id IS NULL AND o.status = ANY($1)
             ORDER BY o.created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(&statuses)
        .bind(page_size)
        .bind(page_offset(page, page_size))
        .fetch_all(self.pool)
        .await?;

        Ok((orders, total))
    }

    /// A rider's delivered orders, newest delivery first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_rider_history(
        &self,
        rider_user_id: UserId,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<OrderWithParties>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE rider_id = $1 AND status = 'delivered'",
        )
        .bind(rider_user_id)
        .fetch_one(self.pool)
        .await?;

        let orders = sqlx::query_as::<_, OrderWithParties>(&format!(
            "{SELECT_WITH_PARTIES} WHERE o.rider_id = $1 AND o.status = 'delivered'
             ORDER BY o.actual_delivery_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(rider_user_id)
        .bind(page_size)
        .bind(page_offset(page, page_size))
        .fetch_all(self.pool)
        .await?;

        Ok((orders, total))
    }

    /// Apply an admin status/payment/notes update, conditioned on the status
    /// the caller saw.
    ///
    /// Setting the status to `delivered` stamps the actual delivery time.
    /// Returns `None` if the order's status changed underneath the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
        notes: Option<&str>,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET status = COALESCE($3, status),
                payment_status = COALESCE($4, payment_status),
                notes = COALESCE($5, notes),
                actual_delivery_at = CASE
                    WHEN $3 = 'delivered' THEN NOW()
                    ELSE actual_delivery_at
                END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            ",
        )
        .bind(id)
        .bind(expected)
        .bind(status)
        .bind(payment_status)
        .bind(notes)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Assign a rider to an unassigned, confirmed order.
    ///
    /// One atomic conditional update: sets the rider, advances the status to
    /// `picked_up`, and stamps a delivery estimate 30 minutes out. Exactly
    /// one concurrent caller can win; the rest see `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn accept(
        &self,
        id: OrderId,
        rider_user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET rider_id = $2,
                status = 'picked_up',
                estimated_delivery_at = NOW() + make_interval(mins => $3),
                updated_at = NOW()
            WHERE id = $1 AND rider_id IS NULL AND status = 'confirmed'
            RETURNING *
            ",
        )
        .bind(id)
        .bind(rider_user_id)
        .bind(DELIVERY_ESTIMATE_MINUTES)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Advance delivery status as the assigned rider, conditioned on the
    /// status the caller saw.
    ///
    /// Returns `None` if the caller is not the assigned rider or the status
    /// moved underneath them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_delivery_status(
        &self,
        id: OrderId,
        rider_user_id: UserId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET status = $4,
                actual_delivery_at = CASE
                    WHEN $4 = 'delivered' THEN NOW()
                    ELSE actual_delivery_at
                END,
                updated_at = NOW()
            WHERE id = $1 AND rider_id = $2 AND status = $3
            RETURNING *
            ",
        )
        .bind(id)
        .bind(rider_user_id)
        .bind(expected)
        .bind(next)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Record a payment provider result and mark the payment completed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn record_payment(
        &self,
        id: OrderId,
        result: &PaymentResult,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET payment_status = 'completed',
                payment_result_id = $2,
                payment_result_status = $3,
                payment_result_update_time = $4,
                payment_result_email = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&result.id)
        .bind(&result.status)
        .bind(&result.update_time)
        .bind(&result.email_address)
        .fetch_optional(self.pool)
        .await?;

        order.ok_or(RepositoryError::NotFound)
    }

    /// Dashboard aggregates over the orders table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let stats = sqlx::query_as::<_, OrderStats>(
            r"
            SELECT
                COUNT(*) AS total_orders,
                COALESCE(SUM(total_price) FILTER (WHERE status = 'delivered'), 0)
                    AS total_earnings,
                COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '30 days')
                    AS orders_last_30_days,
                COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '60 days'
                                   AND created_at <  NOW() - INTERVAL '30 days')
                    AS orders_previous_30_days
            FROM orders
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
