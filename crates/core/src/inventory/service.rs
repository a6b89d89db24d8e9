//! Inventory service
//!
//! Stock adjustments go through the atomic store as a single conditional
//! step, so two concurrent decrements can never both pass a stale check.

use std::sync::Arc;
use std::time::Duration;

use storefront_common::time::run_with_deadline;
use storefront_domain::constants::STORE_TIMEOUT_MS;
use storefront_domain::{InventoryRecord, Result, StorefrontError};
use tracing::{info, warn};

use crate::entity::EntityService;
use crate::query::{sort_by_key, SortOrder};
use crate::store_ports::{AtomicStore, CommitResult, WriteStep};

/// Stock levels per product, cached, with atomic adjustments
pub struct InventoryService {
    entities: EntityService<InventoryRecord>,
    atomic: Arc<dyn AtomicStore>,
    timeout: Duration,
}

impl InventoryService {
    /// Reads go through `entities`; adjustments run as units on `atomic`
    pub fn new(entities: EntityService<InventoryRecord>, atomic: Arc<dyn AtomicStore>) -> Self {
        Self { entities, atomic, timeout: Duration::from_millis(STORE_TIMEOUT_MS) }
    }

    /// Bound every stock adjustment unit by `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying read-through service
    pub fn entities(&self) -> &EntityService<InventoryRecord> {
        &self.entities
    }

    pub async fn get_all(&self) -> Result<Vec<InventoryRecord>> {
        self.entities.get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<InventoryRecord>> {
        self.entities.get_by_id(id).await
    }

    /// The record for `product_id`, found in the cached snapshot
    pub async fn get_by_product(&self, product_id: i64) -> Result<Option<InventoryRecord>> {
        Ok(self.get_all().await?.into_iter().find(|r| r.product_id == product_id))
    }

    /// Insert a record; negative quantities are rejected before the store
    pub async fn add(&self, record: &InventoryRecord) -> Result<i64> {
        Self::check_quantity(record.quantity_available)?;
        self.entities.add(record).await
    }

    /// Replace a record; negative quantities are rejected
    pub async fn update(&self, record: &InventoryRecord) -> Result<bool> {
        Self::check_quantity(record.quantity_available)?;
        self.entities.update(record).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.entities.delete(id).await
    }

    /// Overwrite the stock level of `product_id`; `false` when the product
    /// has no inventory row
    pub async fn set_quantity(&self, product_id: i64, quantity: i64) -> Result<bool> {
        Self::check_quantity(quantity)?;
        let Some(mut record) = self.get_by_product(product_id).await? else {
            return Ok(false);
        };
        record.quantity_available = quantity;
        self.entities.update(&record).await
    }

    /// Whether `product_id` has at least one unit
    pub async fn in_stock(&self, product_id: i64) -> Result<bool> {
        Ok(self.get_by_product(product_id).await?.is_some_and(|r| r.in_stock()))
    }

    /// Whether `product_id` has at least `quantity` units
    pub async fn has_enough_stock(&self, product_id: i64, quantity: i64) -> Result<bool> {
        Ok(self.get_by_product(product_id).await?.is_some_and(|r| r.has_at_least(quantity)))
    }

    /// Take `quantity` units out of stock.
    ///
    /// Returns `Ok(false)` without writing when there is not enough stock.
    pub async fn reduce_stock(&self, product_id: i64, quantity: i64) -> Result<bool> {
        Self::check_positive(quantity)?;
        if !self.has_enough_stock(product_id, quantity).await? {
            return Ok(false);
        }
        self.adjust(product_id, -quantity).await
    }

    /// Put `quantity` units back into stock
    pub async fn add_stock(&self, product_id: i64, quantity: i64) -> Result<bool> {
        Self::check_positive(quantity)?;
        self.adjust(product_id, quantity).await
    }

    /// Records with nothing left
    pub async fn out_of_stock(&self) -> Result<Vec<InventoryRecord>> {
        let mut records = self.get_all().await?;
        records.retain(|r| r.quantity_available == 0);
        Ok(records)
    }

    /// Records below `threshold`, scarcest first
    pub async fn low_stock(&self, threshold: i64) -> Result<Vec<InventoryRecord>> {
        let mut records = self.get_all().await?;
        records.retain(|r| r.quantity_available < threshold);
        sort_by_key(&mut records, SortOrder::Ascending, |r| r.quantity_available);
        Ok(records)
    }

    pub async fn sort_by_quantity(&self, order: SortOrder) -> Result<Vec<InventoryRecord>> {
        let mut records = self.get_all().await?;
        sort_by_key(&mut records, order, |r| r.quantity_available);
        Ok(records)
    }

    async fn adjust(&self, product_id: i64, delta: i64) -> Result<bool> {
        let unit = self.atomic.run_atomic(vec![WriteStep::AdjustStock { product_id, delta }]);
        let outcome = match run_with_deadline("inventory.run_atomic", self.timeout, unit).await {
            Ok(outcome) => outcome,
            Err(deadline) => {
                // The unit may still land after we stop waiting
                warn!(product_id, delta, error = %deadline, "stock adjustment timed out");
                self.entities.invalidate();
                return Err(StorefrontError::Timeout(deadline.to_string()));
            }
        };

        match outcome {
            CommitResult::Committed(_) => {
                self.entities.invalidate();
                info!(product_id, delta, "stock adjusted");
                Ok(true)
            }
            CommitResult::RolledBack(StorefrontError::PartialWrite { reason, .. }) => {
                // The conditional step refused: the row vanished or stock ran
                // out since the check above.
                warn!(product_id, delta, reason = %reason, "stock adjustment refused");
                self.entities.invalidate();
                Ok(false)
            }
            CommitResult::RolledBack(err) => Err(err),
        }
    }

    fn check_quantity(quantity: i64) -> Result<()> {
        if quantity < 0 {
            return Err(StorefrontError::InvalidInput(format!(
                "stock quantity must not be negative: {quantity}"
            )));
        }
        Ok(())
    }

    fn check_positive(quantity: i64) -> Result<()> {
        if quantity <= 0 {
            return Err(StorefrontError::InvalidInput(format!(
                "stock adjustment must be positive: {quantity}"
            )));
        }
        Ok(())
    }
}
