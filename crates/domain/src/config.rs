//! Configuration management

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CACHE_JANITOR_INTERVAL_SECS, CATEGORY_CACHE_TTL_SECS, DEFAULT_DB_PATH, DEFAULT_POOL_SIZE,
    INVENTORY_CACHE_TTL_SECS, ORDER_CACHE_TTL_SECS, PRODUCT_CACHE_TTL_SECS,
    REVIEW_CACHE_TTL_SECS, STORE_TIMEOUT_MS, USER_CACHE_TTL_SECS,
};
use crate::money;
use crate::types::EntityKind;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheTtlConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub orders: OrderConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Per-family cache lifetimes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheTtlConfig {
    pub product_ttl_secs: u64,
    pub user_ttl_secs: u64,
    pub order_ttl_secs: u64,
    pub inventory_ttl_secs: u64,
    pub category_ttl_secs: u64,
    pub review_ttl_secs: u64,
    /// How often expired entries are swept; `0` disables the sweep
    pub janitor_interval_secs: u64,
}

impl CacheTtlConfig {
    /// TTL configured for `kind`
    pub fn ttl_for(&self, kind: EntityKind) -> Duration {
        let secs = match kind {
            EntityKind::Product => self.product_ttl_secs,
            EntityKind::User => self.user_ttl_secs,
            EntityKind::Order => self.order_ttl_secs,
            EntityKind::Inventory => self.inventory_ttl_secs,
            EntityKind::Category => self.category_ttl_secs,
            EntityKind::Review => self.review_ttl_secs,
        };
        Duration::from_secs(secs)
    }

    /// Sweep interval; `None` when configured as zero
    pub fn janitor_interval(&self) -> Option<Duration> {
        (self.janitor_interval_secs > 0).then(|| Duration::from_secs(self.janitor_interval_secs))
    }
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            product_ttl_secs: PRODUCT_CACHE_TTL_SECS,
            user_ttl_secs: USER_CACHE_TTL_SECS,
            order_ttl_secs: ORDER_CACHE_TTL_SECS,
            inventory_ttl_secs: INVENTORY_CACHE_TTL_SECS,
            category_ttl_secs: CATEGORY_CACHE_TTL_SECS,
            review_ttl_secs: REVIEW_CACHE_TTL_SECS,
            janitor_interval_secs: CACHE_JANITOR_INTERVAL_SECS,
        }
    }
}

/// Store access configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound on any single store round-trip
    pub timeout_ms: u64,
}

impl StoreConfig {
    /// Deadline for a single store call
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { timeout_ms: STORE_TIMEOUT_MS }
    }
}

/// Order placement configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Fraction of the subtotal charged as tax
    pub tax_rate: Decimal,
    /// Reserve stock inside the same atomic unit as the order rows
    pub decrement_stock: bool,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self { tax_rate: money::default_tax_rate(), decrement_stock: false }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: DEFAULT_DB_PATH.to_string(),
                pool_size: DEFAULT_POOL_SIZE,
            },
            cache: CacheTtlConfig::default(),
            store: StoreConfig::default(),
            orders: OrderConfig::default(),
        }
    }
}
