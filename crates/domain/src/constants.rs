//! Application constants
//!
//! Centralized location for domain-level defaults used throughout the
//! storefront.

// Cache time-to-live per entity family (seconds)
pub const PRODUCT_CACHE_TTL_SECS: u64 = 300;
pub const USER_CACHE_TTL_SECS: u64 = 300;
pub const ORDER_CACHE_TTL_SECS: u64 = 180;
pub const INVENTORY_CACHE_TTL_SECS: u64 = 120;
pub const CATEGORY_CACHE_TTL_SECS: u64 = 600;
pub const REVIEW_CACHE_TTL_SECS: u64 = 300;

// Background sweep of expired cache entries
pub const CACHE_JANITOR_INTERVAL_SECS: u64 = 60;

// Store access
pub const STORE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_POOL_SIZE: u32 = 8;
pub const DEFAULT_DB_PATH: &str = "storefront.db";

// Orders
/// Tax rate applied to the order subtotal, in percent
pub const DEFAULT_TAX_RATE_PERCENT: i64 = 10;
/// Scale (decimal places) used for every monetary amount
pub const MONEY_SCALE: u32 = 2;

// Catalogue
/// Pseudo category meaning "no category filter"
pub const ALL_CATEGORIES: &str = "All";
/// Name reported for a category id that does not resolve
pub const UNKNOWN_CATEGORY: &str = "Unknown";
/// Stock level below which a product counts as low
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

// Reviews
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
/// Lowest rating counted as a high rating
pub const HIGH_RATING_THRESHOLD: u8 = 4;

// Slow store call threshold that triggers a slow-query log entry (ms)
pub const SLOW_QUERY_THRESHOLD_MS: u64 = 500;
