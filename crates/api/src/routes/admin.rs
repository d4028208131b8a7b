//! Admin dashboard route handlers.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::db::{OrderRepository, RiderRepository};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Aggregates rendered on the embedded admin dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_orders: i64,
    pub active_riders: i64,
    /// Sum of delivered order totals.
    pub total_earnings: Decimal,
    /// Order volume growth, last 30 days vs. the 30 before, in percent.
    pub growth_rate: f64,
}

/// Percentage growth of `current` over `previous`.
///
/// A previous window of zero reads as 100% growth if anything happened at
/// all, and 0% otherwise.
#[allow(clippy::cast_precision_loss)] // Order counts never exceed f64 precision
fn growth_rate(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        if current > 0 { 100.0 } else { 0.0 }
    } else {
        ((current - previous) as f64 / previous as f64) * 100.0
    }
}

/// Dashboard aggregates (admin).
#[instrument(skip(admin, state))]
pub async fn stats(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<AdminStats>> {
    let orders = OrderRepository::new(state.pool()).stats().await?;
    let active_riders = RiderRepository::new(state.pool()).count_active().await?;

    Ok(Json(AdminStats {
        total_orders: orders.total_orders,
        active_riders,
        total_earnings: orders.total_earnings,
        growth_rate: growth_rate(orders.orders_last_30_days, orders.orders_previous_30_days),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_rate_against_empty_window() {
        assert!((growth_rate(0, 0) - 0.0).abs() < f64::EPSILON);
        assert!((growth_rate(5, 0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_growth_rate_doubling() {
        assert!((growth_rate(20, 10) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_growth_rate_decline() {
        assert!((growth_rate(5, 10) - -50.0).abs() < f64::EPSILON);
    }
}
