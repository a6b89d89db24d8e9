//! Stock levels per product

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::NEW_ID;

/// Quantity on hand for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: i64,
    pub product_id: i64,
    /// Denormalised from the product on read
    pub product_name: Option<String>,
    pub quantity_available: i64,
    pub last_updated: DateTime<Utc>,
}

impl InventoryRecord {
    /// A record not yet persisted, stamped with the current time
    pub fn new(product_id: i64, quantity_available: i64) -> Self {
        Self {
            id: NEW_ID,
            product_id,
            product_name: None,
            quantity_available,
            last_updated: Utc::now(),
        }
    }

    pub fn in_stock(&self) -> bool {
        self.quantity_available > 0
    }

    /// Whether at least `quantity` units are available
    pub fn has_at_least(&self, quantity: i64) -> bool {
        self.quantity_available >= quantity
    }
}
