//! Transient cart lines consumed by order placement

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

/// One product in a shopping cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(
        product_id: i64,
        product_name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self { product_id, product_name: product_name.into(), unit_price, quantity }
    }

    /// `unit_price × quantity`
    pub fn line_total(&self) -> Decimal {
        money::line_total(self.unit_price, self.quantity)
    }
}
