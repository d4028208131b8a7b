//! Product catalog model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use velocart_core::{Gender, ProductId};

/// A catalog product.
///
/// `price` is the live price; carts and orders snapshot it at add/checkout
/// time rather than referencing it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL slug, unique, derived from the name when not supplied.
    pub slug: String,
    pub sku: Option<String>,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: Decimal,
    pub count_in_stock: i32,
    pub rating: f64,
    pub num_reviews: i32,
    pub featured: bool,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_serializes_camel_case() {
        let product = Product {
            id: ProductId::new(1),
            name: "Aurora Ceiling Fan".to_owned(),
            slug: "aurora-ceiling-fan".to_owned(),
            sku: Some("FAN-AUR-0001".to_owned()),
            description: "52-inch ceiling fan".to_owned(),
            brand: "Aurora".to_owned(),
            category: "Fan".to_owned(),
            price: Decimal::new(4999, 2),
            count_in_stock: 10,
            rating: 4.5,
            num_reviews: 12,
            featured: true,
            images: vec!["/images/fan.jpg".to_owned()],
            sizes: vec!["52\"".to_owned()],
            colors: vec!["white".to_owned()],
            gender: Gender::Unisex,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&product).expect("serialize");
        assert_eq!(json["countInStock"], 10);
        assert_eq!(json["price"], "49.99");
        assert_eq!(json["gender"], "unisex");
        assert!(json.get("numReviews").is_some());
    }
}
