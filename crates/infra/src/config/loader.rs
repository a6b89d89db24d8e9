//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment if one exists
//! 2. Attempts to load from `STOREFRONT_*` environment variables
//! 3. If the required variables are missing, falls back to a config file
//! 4. If no config file exists either, uses the built-in defaults
//!
//! ## Environment Variables
//! Required:
//! - `STOREFRONT_DB_PATH`: Database file path
//! - `STOREFRONT_DB_POOL_SIZE`: Connection pool size
//!
//! Optional (defaults apply when unset):
//! - `STOREFRONT_STORE_TIMEOUT_MS`: Deadline for a single store call
//! - `STOREFRONT_TAX_RATE`: Tax rate as a decimal fraction, e.g. `0.10`
//! - `STOREFRONT_DECREMENT_STOCK`: Reserve stock when placing orders
//! - `STOREFRONT_CACHE_<FAMILY>_TTL_SECS`: Per-family TTL where `<FAMILY>` is
//!   one of `PRODUCT`, `USER`, `ORDER`, `INVENTORY`, `CATEGORY`, `REVIEW`
//! - `STOREFRONT_CACHE_JANITOR_INTERVAL_SECS`: Expiry sweep interval (`0`
//!   disables it)
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `storefront.{json,toml}` in the
//! working directory, its two parents and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use storefront_domain::{
    CacheTtlConfig, Config, DatabaseConfig, OrderConfig, Result, StoreConfig, StorefrontError,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.json", "config.toml", "storefront.json", "storefront.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `StorefrontError::Config` if an environment variable or config file
/// is present but invalid.
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path)),
                None => {
                    tracing::warn!("No configuration source found, using defaults");
                    Ok(Config::default())
                }
            }
        }
    }
}

/// Load configuration from environment variables
///
/// The database variables are required; every other section falls back to its
/// default when its variables are unset.
///
/// # Errors
/// Returns `StorefrontError::Config` if required variables are missing or any
/// variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let path = env_var("STOREFRONT_DB_PATH")?;
    let pool_size = env_parse::<u32>("STOREFRONT_DB_POOL_SIZE")?
        .ok_or_else(|| missing("STOREFRONT_DB_POOL_SIZE"))?;

    let mut store = StoreConfig::default();
    if let Some(timeout_ms) = env_parse::<u64>("STOREFRONT_STORE_TIMEOUT_MS")? {
        store.timeout_ms = timeout_ms;
    }

    let mut orders = OrderConfig::default();
    if let Some(tax_rate) = env_parse::<Decimal>("STOREFRONT_TAX_RATE")? {
        orders.tax_rate = tax_rate;
    }
    orders.decrement_stock = env_bool("STOREFRONT_DECREMENT_STOCK", orders.decrement_stock);

    Ok(Config { database: DatabaseConfig { path, pool_size }, cache: cache_from_env()?, store, orders })
}

fn cache_from_env() -> Result<CacheTtlConfig> {
    let mut cache = CacheTtlConfig::default();
    let overrides: [(&str, &mut u64); 7] = [
        ("STOREFRONT_CACHE_PRODUCT_TTL_SECS", &mut cache.product_ttl_secs),
        ("STOREFRONT_CACHE_USER_TTL_SECS", &mut cache.user_ttl_secs),
        ("STOREFRONT_CACHE_ORDER_TTL_SECS", &mut cache.order_ttl_secs),
        ("STOREFRONT_CACHE_INVENTORY_TTL_SECS", &mut cache.inventory_ttl_secs),
        ("STOREFRONT_CACHE_CATEGORY_TTL_SECS", &mut cache.category_ttl_secs),
        ("STOREFRONT_CACHE_REVIEW_TTL_SECS", &mut cache.review_ttl_secs),
        ("STOREFRONT_CACHE_JANITOR_INTERVAL_SECS", &mut cache.janitor_interval_secs),
    ];
    for (key, slot) in overrides {
        if let Some(secs) = env_parse::<u64>(key)? {
            *slot = secs;
        }
    }
    Ok(cache)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. JSON and TOML are
/// supported (detected by file extension).
///
/// # Errors
/// Returns `StorefrontError::Config` if the file cannot be found or read, or
/// does not parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(StorefrontError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            StorefrontError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| StorefrontError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| StorefrontError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| StorefrontError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(StorefrontError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
        roots.push(cwd.join("../.."));
    }

    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn missing(key: &str) -> StorefrontError {
    StorefrontError::Config(format!("Missing required environment variable: {key}"))
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| missing(key))
}

/// Parse an optional environment variable; unset yields `None`.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| StorefrontError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
