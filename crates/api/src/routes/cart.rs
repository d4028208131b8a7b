//! Cart route handlers.
//!
//! The cart is created lazily on first add; a user with no cart simply gets
//! the empty shape back. Each line captures the product's price at add time.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use velocart_core::{ProductId, UserId};

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::product::Product;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Set-quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// A cart line joined with its live product.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product: Product,
    pub quantity: i32,
    pub price: Decimal,
}

/// The cart as served to clients.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: Decimal,
}

impl CartView {
    /// The empty cart shape served before a cart exists.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
        }
    }
}

/// Load the caller's cart with products joined in.
///
/// Lines whose product has since been deleted are dropped from the view.
async fn load_cart(state: &AppState, user_id: UserId) -> Result<CartView> {
    let items = CartRepository::new(state.pool()).items(user_id).await?;
    if items.is_empty() {
        return Ok(CartView::empty());
    }

    let ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
    let products = ProductRepository::new(state.pool()).get_many(&ids).await?;
    let mut by_id: HashMap<ProductId, Product> =
        products.into_iter().map(|p| (p.id, p)).collect();

    // Lines whose product vanished are dropped from both the view and the total
    let mut lines = Vec::with_capacity(items.len());
    let mut total = Decimal::ZERO;
    for item in &items {
        if let Some(product) = by_id.remove(&item.product_id) {
            total += item.line_total();
            lines.push(CartLineView {
                product,
                quantity: item.quantity,
                price: item.price,
            });
        }
    }

    Ok(CartView {
        items: lines,
        total,
    })
}

/// Get the caller's cart.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CartView>> {
    Ok(Json(load_cart(&state, user.id).await?))
}

/// Add a product to the caller's cart.
///
/// Increments the quantity when the product is already a line item.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    if body.quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be a positive integer".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .get(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    CartRepository::new(state.pool())
        .add_item(user.id, product.id, body.quantity, product.price)
        .await?;

    Ok((StatusCode::CREATED, Json(load_cart(&state, user.id).await?)))
}

/// Set the quantity of an existing cart line.
///
/// A quantity of zero removes the line, so removing the last unit removes
/// the line item.
#[instrument(skip(state, user))]
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateCartItemRequest>,
) -> Result<Json<CartView>> {
    if body.quantity < 0 {
        return Err(AppError::BadRequest(
            "quantity cannot be negative".to_owned(),
        ));
    }

    CartRepository::new(state.pool())
        .set_quantity(user.id, product_id, body.quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Item not found in cart".to_owned()),
            other => other.into(),
        })?;

    Ok(Json(load_cart(&state, user.id).await?))
}

/// Remove a cart line. Idempotent if the product is not in the cart.
#[instrument(skip(state, user))]
pub async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>> {
    CartRepository::new(state.pool())
        .remove_item(user.id, product_id)
        .await?;

    Ok(Json(load_cart(&state, user.id).await?))
}

/// Empty the caller's cart.
#[instrument(skip(state, user))]
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>> {
    CartRepository::new(state.pool()).clear(user.id).await?;

    Ok(Json(json!({ "message": "Cart cleared successfully" })))
}
