//! Orders and their line items

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StorefrontError};
use crate::impl_domain_status_conversions;
use crate::money;
use crate::types::{CartLine, NEW_ID};

/// Lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl_domain_status_conversions!(OrderStatus {
    Pending => "pending",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Every status, in lifecycle order
    pub const ALL: [Self; 5] =
        [Self::Pending, Self::Processing, Self::Shipped, Self::Delivered, Self::Cancelled];

    /// Delivered and cancelled orders never change status again
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether moving from `self` to `next` is allowed
    pub fn can_transition_to(self, next: Self) -> bool {
        self != next && !self.is_terminal()
    }
}

/// One product line of an order
///
/// Immutable once the order commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLineItem {
    /// An unpersisted line item built from a cart line
    pub fn from_cart_line(line: &CartLine) -> Self {
        Self {
            id: NEW_ID,
            order_id: NEW_ID,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }

    /// Unit price times quantity
    pub fn subtotal(&self) -> Decimal {
        money::line_total(self.unit_price, self.quantity)
    }

    /// Reject a zero quantity or a negative price
    pub fn validate(&self) -> Result<()> {
        if self.quantity == 0 {
            return Err(StorefrontError::InvalidInput(format!(
                "line item for product {} must have a positive quantity",
                self.product_id
            )));
        }
        if self.unit_price.is_sign_negative() {
            return Err(StorefrontError::InvalidInput(format!(
                "line item for product {} has a negative unit price",
                self.product_id
            )));
        }
        Ok(())
    }
}

/// A placed order with its line items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub line_items: Vec<OrderLineItem>,
}

impl Order {
    /// A pending, unpersisted order
    pub fn pending(user_id: i64, total_amount: Decimal, line_items: Vec<OrderLineItem>) -> Self {
        Self {
            id: NEW_ID,
            user_id,
            status: OrderStatus::Pending,
            total_amount,
            created_at: Utc::now(),
            line_items,
        }
    }

    pub fn item_count(&self) -> u32 {
        self.line_items.iter().map(|item| item.quantity).sum()
    }
}

/// Subtotal, tax and grand total of a set of cart lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Subtotal of `lines` plus tax at `tax_rate`
    pub fn from_lines(lines: &[CartLine], tax_rate: Decimal) -> Self {
        let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();
        let tax = money::tax_on(subtotal, tax_rate);
        Self { subtotal, tax, total: subtotal + tax }
    }
}
