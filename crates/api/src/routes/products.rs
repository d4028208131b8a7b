//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use velocart_core::{Gender, ProductId};

use crate::db::page_count;
use crate::db::products::{NewProduct, ProductFilter, ProductRepository, ProductUpdate};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::Product;
use crate::state::AppState;

/// Catalog page size, matching the storefront grid.
const PAGE_SIZE: i64 = 8;

/// Catalog listing query string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub featured: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub keyword: Option<String>,
    pub page: Option<i64>,
}

/// Paginated catalog response.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: i64,
    pub pages: i64,
    pub total: i64,
}

/// Create-product request body (admin).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub count_in_stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub gender: Gender,
    #[serde(default)]
    pub featured: bool,
}

/// Update-product request body (admin); absent fields are unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub count_in_stock: Option<i32>,
    pub images: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub gender: Option<Gender>,
    pub featured: Option<bool>,
}

/// Filtered, paginated catalog listing, newest first.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductPage>> {
    let filter = ProductFilter {
        category: query.category,
        size: query.size,
        color: query.color,
        featured: query.featured == Some(true),
        min_price: query.min_price,
        max_price: query.max_price,
        keyword: query.keyword,
    };

    let page = query.page.unwrap_or(1).max(1);
    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, page, PAGE_SIZE)
        .await?;

    Ok(Json(ProductPage {
        products,
        page,
        pages: page_count(total, PAGE_SIZE),
        total,
    }))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product))
}

/// Create a product (admin).
#[instrument(skip(state, body))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    if body.price < Decimal::ZERO {
        return Err(AppError::BadRequest("price cannot be negative".to_owned()));
    }
    if body.count_in_stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".to_owned()));
    }

    let product = ProductRepository::new(state.pool())
        .create(&NewProduct {
            name: body.name,
            slug: body.slug,
            sku: body.sku,
            description: body.description,
            brand: body.brand,
            category: body.category,
            price: body.price,
            count_in_stock: body.count_in_stock,
            images: body.images,
            sizes: body.sizes,
            colors: body.colors,
            gender: body.gender,
            featured: body.featured,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (admin).
#[instrument(skip(state, body))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    if body.price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::BadRequest("price cannot be negative".to_owned()));
    }
    if body.count_in_stock.is_some_and(|c| c < 0) {
        return Err(AppError::BadRequest("stock cannot be negative".to_owned()));
    }

    let product = ProductRepository::new(state.pool())
        .update(
            id,
            &ProductUpdate {
                name: body.name,
                description: body.description,
                brand: body.brand,
                category: body.category,
                price: body.price,
                count_in_stock: body.count_in_stock,
                images: body.images,
                sizes: body.sizes,
                colors: body.colors,
                gender: body.gender,
                featured: body.featured,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Product not found".to_owned())
            }
            other => other.into(),
        })?;

    Ok(Json(product))
}

/// Delete a product (admin).
#[instrument(skip(state))]
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;

    if !deleted {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    Ok(Json(json!({ "message": "Product removed" })))
}
