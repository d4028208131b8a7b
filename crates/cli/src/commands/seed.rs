//! Seed the product catalog from a YAML fixture file.
//!
//! Each entry carries the catalog fields; slugs are derived from the name
//! and SKUs take the form `CAT-BRA-0001` from category, brand, and the
//! entry's position in the file.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use velocart_core::{derive_sku, slugify};

use super::{CliError, connect};

/// Errors that can occur during seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Shared CLI error (environment, database).
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Fixture file could not be read.
    #[error("Failed to read {0}: {1}")]
    Io(String, std::io::Error),

    /// Fixture file could not be parsed.
    #[error("Failed to parse fixture file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl From<sqlx::Error> for SeedError {
    fn from(e: sqlx::Error) -> Self {
        Self::Cli(CliError::Database(e))
    }
}

/// One product entry in the fixture file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedProduct {
    name: String,
    description: String,
    brand: String,
    category: String,
    price: Decimal,
    #[serde(default)]
    count_in_stock: i32,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    sizes: Vec<String>,
    #[serde(default)]
    colors: Vec<String>,
    gender: String,
    #[serde(default)]
    featured: bool,
}

/// Seed products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML fixture file
/// * `clear_existing` - If true, delete all existing products first
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a database
/// operation fails.
pub async fn products(file_path: &str, clear_existing: bool) -> Result<(), SeedError> {
    tracing::info!(path = %file_path, "Loading product fixtures");

    // Read and parse before connecting to the database
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|e| SeedError::Io(file_path.to_owned(), e))?;
    let entries: Vec<SeedProduct> = serde_yaml::from_str(&content)?;

    tracing::info!(products = entries.len(), "Parsed fixture file");

    let pool = connect().await?;

    if clear_existing {
        tracing::info!("Clearing existing products");
        sqlx::query("DELETE FROM products").execute(&pool).await?;
    }

    let mut inserted = 0usize;
    let mut skipped = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        let slug = slugify(&entry.name);
        let sku = derive_sku(&entry.category, &entry.brand, index + 1);

        let result = sqlx::query(
            r"
            INSERT INTO products
                (name, slug, sku, description, brand, category, price,
                 count_in_stock, images, sizes, colors, gender, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (slug) DO NOTHING
            ",
        )
        .bind(&entry.name)
        .bind(&slug)
        .bind(&sku)
        .bind(&entry.description)
        .bind(&entry.brand)
        .bind(&entry.category)
        .bind(entry.price)
        .bind(entry.count_in_stock)
        .bind(&entry.images)
        .bind(&entry.sizes)
        .bind(&entry.colors)
        .bind(&entry.gender)
        .bind(entry.featured)
        .execute(&pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        } else {
            skipped += 1;
            tracing::warn!(slug = %slug, "Product already exists, skipped");
        }
    }

    tracing::info!("Seeding complete!");
    tracing::info!("  Products inserted: {inserted}");
    tracing::info!("  Products skipped (already exist): {skipped}");

    Ok(())
}
