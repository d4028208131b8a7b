//! Cart models.

use rust_decimal::Decimal;
use serde::Serialize;

use velocart_core::{CartId, ProductId};

/// One line of a cart: a product reference, quantity, and the unit price
/// captured when the line was added.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(skip)]
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

impl CartItem {
    /// Line total: snapshot price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = CartItem {
            cart_id: CartId::new(1),
            product_id: ProductId::new(2),
            quantity: 2,
            price: Decimal::new(4999, 2),
        };
        assert_eq!(item.line_total(), Decimal::new(9998, 2));
    }
}
