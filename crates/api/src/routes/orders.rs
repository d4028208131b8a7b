//! Order route handlers: checkout, listings, status lifecycle, and the
//! rider delivery flow.
//!
//! Two rules hold everywhere here:
//!
//! - Totals are recomputed server-side from authoritative product prices; a
//!   client-supplied total that disagrees is rejected.
//! - Status writes go through the `OrderStatus` transition table. Illegal
//!   transitions are 400s, and a write that loses a race (status moved, or
//!   another rider claimed the order first) surfaces as a 409.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use velocart_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId};

use super::PageQuery;
use crate::db::orders::{NewOrder, NewOrderItem, OrderRepository, OrderWithParties};
use crate::db::{ProductRepository, page_count};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireAdmin, RequireRider};
use crate::models::order::{Order, OrderItem, PaymentResult, ShippingAddress};
use crate::models::user::UserSummary;
use crate::state::AppState;

/// Orders per listing page.
const PAGE_SIZE: i64 = 10;

/// Checkout request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_items: Vec<OrderItemInput>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    /// Client-computed total; verified against the server-side computation.
    pub total_price: Decimal,
}

/// One checkout line: the product reference and requested quantity. Name,
/// image, and price snapshots are taken from the product server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product: ProductId,
    pub qty: i32,
}

/// Admin status update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

/// Rider delivery update request body.
#[derive(Debug, Deserialize)]
pub struct DeliveryUpdateRequest {
    pub status: OrderStatus,
}

/// An order as served to clients: row fields, line items, and the joined
/// identities.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rider: Option<UserSummary>,
}

/// Paginated order listing response.
#[derive(Debug, Serialize)]
pub struct OrderPage {
    pub orders: Vec<OrderView>,
    pub page: i64,
    pub pages: i64,
    pub total: i64,
}

/// Build an [`OrderView`] from a joined row and its line items.
fn order_view(row: OrderWithParties, items: Vec<OrderItem>) -> OrderView {
    let user = UserSummary {
        id: row.order.user_id,
        name: row.user_name,
        email: Some(row.user_email),
        phone: None,
    };

    let rider = row.order.rider_id.map(|id| UserSummary {
        id,
        name: row.rider_name.unwrap_or_default(),
        email: row.rider_email,
        phone: None,
    });

    OrderView {
        order: row.order,
        order_items: items,
        user: Some(user),
        rider,
    }
}

/// Build a page of [`OrderView`]s, batch-fetching line items.
async fn order_views(state: &AppState, rows: Vec<OrderWithParties>) -> Result<Vec<OrderView>> {
    let ids: Vec<OrderId> = rows.iter().map(|r| r.order.id).collect();
    let items = OrderRepository::new(state.pool()).items_for(&ids).await?;

    let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let items = by_order.remove(&row.order.id).unwrap_or_default();
            order_view(row, items)
        })
        .collect())
}

/// Generate a tracking number like `VC-8F3KQ2M9XD`.
fn generate_tracking_number() -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();

    format!("VC-{suffix}")
}

/// Create an order from the caller's checkout payload.
///
/// Line snapshots (name, image, unit price) come from the product table, the
/// total is recomputed server-side, and stock is revalidated and decremented
/// atomically inside the creation transaction.
#[instrument(skip(state, user, body))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderView>)> {
    if body.order_items.is_empty() {
        return Err(AppError::BadRequest("No order items".to_owned()));
    }

    let ids: Vec<ProductId> = body.order_items.iter().map(|i| i.product).collect();
    let distinct: std::collections::HashSet<ProductId> = ids.iter().copied().collect();
    if distinct.len() != ids.len() {
        return Err(AppError::BadRequest(
            "duplicate product in order items".to_owned(),
        ));
    }

    let products = ProductRepository::new(state.pool()).get_many(&ids).await?;
    let by_id: HashMap<ProductId, _> = products.into_iter().map(|p| (p.id, p)).collect();

    let mut items = Vec::with_capacity(body.order_items.len());
    let mut items_price = Decimal::ZERO;

    for line in &body.order_items {
        let product = by_id
            .get(&line.product)
            .ok_or_else(|| AppError::NotFound(format!("Product not found: {}", line.product)))?;

        if line.qty < 1 {
            return Err(AppError::BadRequest(
                "quantity must be a positive integer".to_owned(),
            ));
        }

        items_price += product.price * Decimal::from(line.qty);
        items.push(NewOrderItem {
            product_id: product.id,
            name: product.name.clone(),
            qty: line.qty,
            image: product.images.first().cloned().unwrap_or_default(),
            price: product.price,
        });
    }

    let tax_price = Decimal::ZERO;
    let shipping_price = Decimal::ZERO;
    let total_price = items_price + tax_price + shipping_price;

    if body.total_price != total_price {
        return Err(AppError::BadRequest(format!(
            "order total mismatch: expected {total_price}, got {}",
            body.total_price
        )));
    }

    let (order, order_items) = OrderRepository::new(state.pool())
        .create(
            user.id,
            &NewOrder {
                items,
                shipping: body.shipping_address,
                payment_method: body.payment_method,
                items_price,
                tax_price,
                shipping_price,
                total_price,
                tracking_number: generate_tracking_number(),
            },
        )
        .await?;

    tracing::info!(order_id = %order.id, user_id = %user.id, "order created");

    let view = OrderView {
        order,
        order_items,
        user: Some(UserSummary {
            id: user.id,
            name: user.name,
            email: Some(user.email),
            phone: None,
        }),
        rider: None,
    };

    Ok((StatusCode::CREATED, Json(view)))
}

/// The caller's orders, paginated, newest first.
#[instrument(skip(state, user))]
pub async fn my_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<OrderPage>> {
    let page = query.page();
    let (rows, total) = OrderRepository::new(state.pool())
        .list_for_user(user.id, page, PAGE_SIZE)
        .await?;

    Ok(Json(OrderPage {
        orders: order_views(&state, rows).await?,
        page,
        pages: page_count(total, PAGE_SIZE),
        total,
    }))
}

/// All orders, paginated, newest first (admin).
#[instrument(skip(admin, state))]
pub async fn list_all(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<OrderPage>> {
    let page = query.page();
    let (rows, total) = OrderRepository::new(state.pool())
        .list_all(page, PAGE_SIZE)
        .await?;

    Ok(Json(OrderPage {
        orders: order_views(&state, rows).await?,
        page,
        pages: page_count(total, PAGE_SIZE),
        total,
    }))
}

/// One order. Visible to its owner, its assigned rider, and admins.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let repo = OrderRepository::new(state.pool());
    let row = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    let is_owner = row.order.user_id == user.id;
    let is_assigned_rider = row.order.rider_id == Some(user.id);

    if !(is_owner || is_assigned_rider || user.is_admin()) {
        return Err(AppError::Forbidden("Not authorized".to_owned()));
    }

    let items = repo.items_for(&[id]).await?;
    Ok(Json(order_view(row, items)))
}

/// Update status, payment status, and notes (admin).
///
/// Status changes are validated against the lifecycle transition table;
/// re-asserting the current status is a no-op. Setting `delivered` stamps
/// the actual delivery time.
#[instrument(skip(admin, state, body))]
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    let current = existing.order.status;
    let next = body.status.filter(|next| *next != current);

    if let Some(next) = next
        && !current.can_transition_to(next)
    {
        return Err(AppError::BadRequest(format!(
            "illegal status transition: {current} -> {next}"
        )));
    }

    let updated = repo
        .update_status(id, current, next, body.payment_status, body.notes.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::Conflict("order was modified concurrently, retry".to_owned())
        })?;

    tracing::info!(order_id = %id, admin_id = %admin.id, status = %updated.status, "order status updated");

    Ok(Json(updated))
}

/// Record a payment provider result against the caller's own order.
#[instrument(skip(state, user, body))]
pub async fn record_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
    Json(body): Json<PaymentResult>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if existing.order.user_id != user.id {
        return Err(AppError::Forbidden("Not authorized".to_owned()));
    }

    let updated = repo.record_payment(id, &body).await?;

    Ok(Json(updated))
}

/// Claimable orders: unassigned, in a rider-eligible status (rider).
#[instrument(skip(rider, state))]
pub async fn claimable(
    RequireRider(rider): RequireRider,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<OrderPage>> {
    let page = query.page();
    let (rows, total) = OrderRepository::new(state.pool())
        .list_claimable(page, PAGE_SIZE)
        .await?;

    Ok(Json(OrderPage {
        orders: order_views(&state, rows).await?,
        page,
        pages: page_count(total, PAGE_SIZE),
        total,
    }))
}

/// Claim an order for delivery (rider).
///
/// First accept wins: assignment is one conditional update, so the losing
/// rider of a concurrent claim gets a 409 instead of silently overwriting.
#[instrument(skip(state))]
pub async fn accept(
    RequireRider(rider): RequireRider,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());

    if let Some(order) = repo.accept(id, rider.id).await? {
        tracing::info!(order_id = %id, rider_id = %rider.id, "order accepted for delivery");
        return Ok(Json(order));
    }

    // Lost the conditional update: explain which precondition failed
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if existing.order.rider_id.is_some() {
        return Err(AppError::Conflict(
            "Order already accepted by another rider".to_owned(),
        ));
    }

    Err(AppError::BadRequest(format!(
        "order cannot be picked up from status {}",
        existing.order.status
    )))
}

/// Advance the delivery status of an assigned order (rider).
#[instrument(skip(state, body))]
pub async fn update_delivery(
    RequireRider(rider): RequireRider,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<DeliveryUpdateRequest>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if existing.order.rider_id != Some(rider.id) {
        return Err(AppError::Forbidden("Not authorized".to_owned()));
    }

    let current = existing.order.status;
    if !current.can_transition_to(body.status) {
        return Err(AppError::BadRequest(format!(
            "illegal status transition: {current} -> {}",
            body.status
        )));
    }

    let updated = repo
        .update_delivery_status(id, rider.id, current, body.status)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("order was modified concurrently, retry".to_owned())
        })?;

    tracing::info!(order_id = %id, rider_id = %rider.id, status = %updated.status, "delivery status updated");

    Ok(Json(updated))
}

/// The caller's delivered orders, newest delivery first (rider).
#[instrument(skip(rider, state))]
pub async fn rider_history(
    RequireRider(rider): RequireRider,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<OrderPage>> {
    let page = query.page();
    let (rows, total) = OrderRepository::new(state.pool())
        .list_rider_history(rider.id, page, PAGE_SIZE)
        .await?;

    Ok(Json(OrderPage {
        orders: order_views(&state, rows).await?,
        page,
        pages: page_count(total, PAGE_SIZE),
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_tracking_number_shape() {
        let tn = generate_tracking_number();
        assert!(tn.starts_with("VC-"));
        assert_eq!(tn.len(), 13);
        assert!(
            tn.chars()
                .skip(3)
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generate_tracking_number_varies() {
        let a = generate_tracking_number();
        let b = generate_tracking_number();
        assert_ne!(a, b);
    }
}
