//! Product repository: catalog queries and admin CRUD.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use velocart_core::{Gender, ProductId, slugify};

use super::{RepositoryError, page_offset};
use crate::models::product::Product;

/// Catalog listing filters; every field is optional.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub featured: bool,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub keyword: Option<String>,
}

/// Fields for creating a product.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: Decimal,
    pub count_in_stock: i32,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub gender: Gender,
    pub featured: bool,
}

/// Fields for a partial product update. `None` leaves a field unchanged.
#[derive(Debug, Default)]
pub struct ProductUpdate {
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

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, paginated, newest first.
    ///
    /// Returns the page of products and the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut query = QueryBuilder::new("SELECT * FROM products");
        push_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(page_size);
        query.push(" OFFSET ");
        query.push_bind(page_offset(page, page_size));

        let products = query
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;

        Ok((products, total))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(product)
    }

    /// Get several products by ID (order-total validation at checkout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(&raw_ids)
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// Create a product; the slug is derived from the name when absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug or SKU already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let slug = new.slug.clone().unwrap_or_else(|| slugify(&new.name));

        sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products
                (name, slug, sku, description, brand, category, price,
                 count_in_stock, images, sizes, colors, gender, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            ",
        )
        .bind(&new.name)
        .bind(&slug)
        .bind(&new.sku)
        .bind(&new.description)
        .bind(&new.brand)
        .bind(&new.category)
        .bind(new.price)
        .bind(new.count_in_stock)
        .bind(&new.images)
        .bind(&new.sizes)
        .bind(&new.colors)
        .bind(new.gender)
        .bind(new.featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "product slug or SKU already exists"))
    }

    /// Update a product; unset fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                brand = COALESCE($4, brand),
                category = COALESCE($5, category),
                price = COALESCE($6, price),
                count_in_stock = COALESCE($7, count_in_stock),
                images = COALESCE($8, images),
                sizes = COALESCE($9, sizes),
                colors = COALESCE($10, colors),
                gender = COALESCE($11, gender),
                featured = COALESCE($12, featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.brand)
        .bind(&update.category)
        .bind(update.price)
        .bind(update.count_in_stock)
        .bind(&update.images)
        .bind(&update.sizes)
        .bind(&update.colors)
        .bind(update.gender)
        .bind(update.featured)
        .fetch_optional(self.pool)
        .await?;

        product.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Append the WHERE clause for `filter` to a query.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    query.push(" WHERE TRUE");

    if let Some(category) = &filter.category {
        query.push(" AND category = ");
        query.push_bind(category.clone());
    }

    if let Some(size) = &filter.size {
        query.push(" AND ");
        query.push_bind(size.clone());
        query.push(" = ANY(sizes)");
    }

    if let Some(color) = &filter.color {
        query.push(" AND ");
        query.push_bind(color.clone());
        query.push(" = ANY(colors)");
    }

    if filter.featured {
        query.push(" AND featured");
    }

    if let Some(min_price) = filter.min_price {
        query.push(" AND price >= ");
        query.push_bind(min_price);
    }

    if let Some(max_price) = filter.max_price {
        query.push(" AND price <= ");
        query.push_bind(max_price);
    }

    if let Some(keyword) = &filter.keyword {
        let pattern = format!("%{}%", escape_like(keyword));
        query.push(" AND (name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR description ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR brand ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}

/// Escape `%`, `_`, and `\` in user-supplied LIKE patterns.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("fan"), "fan");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_push_filters_binds_everything() {
        let filter = ProductFilter {
            category: Some("Fan".to_owned()),
            size: Some("52\"".to_owned()),
            color: Some("white".to_owned()),
            featured: true,
            min_price: Some(Decimal::new(1000, 2)),
            max_price: Some(Decimal::new(10_000, 2)),
            keyword: Some("ceiling".to_owned()),
        };

        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM products");
        push_filters(&mut query, &filter);
        let sql = query.sql();

        assert!(sql.contains("category ="));
        assert!(sql.contains("ANY(sizes)"));
        assert!(sql.contains("ANY(colors)"));
        assert!(sql.contains("AND featured"));
        assert!(sql.contains("price >="));
        assert!(sql.contains("price <="));
        assert!(sql.contains("ILIKE"));
    }

    #[test]
    fn test_push_filters_empty_is_where_true() {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM products");
        push_filters(&mut query, &ProductFilter::default());
        assert_eq!(query.sql(), "SELECT COUNT(*) FROM products WHERE TRUE");
    }
}
