//! Order models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use velocart_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId};

/// An order row.
///
/// Line items live in `order_items`; shipping address and payment result are
/// embedded columns. `rider_id` references the assigned rider's user account
/// and is set at most once (enforced by a conditional update).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[sqlx(flatten)]
    #[serde(rename = "shippingAddress")]
    pub shipping: ShippingAddress,
    pub items_price: Decimal,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    pub rider_id: Option<UserId>,
    #[serde(rename = "estimatedDeliveryDate")]
    pub estimated_delivery_at: Option<DateTime<Utc>>,
    #[serde(rename = "actualDeliveryDate")]
    pub actual_delivery_at: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shipping destination captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[sqlx(rename = "ship_address")]
    pub address: String,
    #[sqlx(rename = "ship_city")]
    pub city: String,
    /// Accepted as `zipCode` on checkout input, served as `postalCode`.
    #[sqlx(rename = "ship_postal_code")]
    #[serde(alias = "zipCode")]
    pub postal_code: String,
    #[sqlx(rename = "ship_country")]
    pub country: String,
}

/// A line item snapshot: name, image, and unit price copied from the product
/// at checkout, not a live reference.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(skip)]
    pub order_id: OrderId,
    #[serde(rename = "product")]
    pub product_id: ProductId,
    pub name: String,
    pub qty: i32,
    pub image: String,
    pub price: Decimal,
}

/// Payment provider result recorded against an order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    #[sqlx(rename = "payment_result_id")]
    pub id: String,
    #[sqlx(rename = "payment_result_status")]
    pub status: String,
    #[sqlx(rename = "payment_result_update_time")]
    #[serde(alias = "update_time")]
    pub update_time: String,
    #[sqlx(rename = "payment_result_email")]
    #[serde(alias = "email_address")]
    pub email_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_address_accepts_zip_code_alias() {
        let json = r#"{"address":"1 Main St","city":"Dhaka","zipCode":"1212","country":"BD"}"#;
        let addr: ShippingAddress = serde_json::from_str(json).expect("deserialize");
        assert_eq!(addr.postal_code, "1212");

        let out = serde_json::to_value(&addr).expect("serialize");
        assert_eq!(out["postalCode"], "1212");
    }
}
