//! Shopping cart
//!
//! Request scoped: one cart per shopper session, consumed when its order
//! commits.

use rust_decimal::Decimal;
use storefront_domain::{CartLine, OrderTotals};

/// Lines a customer intends to order, one per product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line; a product already in the cart has its quantity increased
    /// instead of getting a second line
    pub fn add(&mut self, line: CartLine) {
        if line.quantity == 0 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => self.lines.push(line),
        }
    }

    /// Returns whether a line was removed
    pub fn remove(&mut self, product_id: i64) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Set the quantity of a product already in the cart; zero or less
    /// removes the line
    pub fn update_quantity(&mut self, product_id: i64, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Sum of line totals, before tax
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Subtotal, tax and total at `tax_rate`
    pub fn totals(&self, tax_rate: Decimal) -> OrderTotals {
        OrderTotals::from_lines(&self.lines, tax_rate)
    }

    /// Number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in the order they were first added
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Move every line out, leaving the cart empty
    pub fn take_lines(&mut self) -> Vec<CartLine> {
        std::mem::take(&mut self.lines)
    }
}
