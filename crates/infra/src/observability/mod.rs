//! Logging initialisation
//!
//! Installs a `tracing` subscriber filtered by `RUST_LOG` (falling back to
//! [`DEFAULT_FILTER`]) that writes either human-readable or JSON lines.

use std::str::FromStr;

use storefront_domain::{Result, StorefrontError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "storefront=info";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(StorefrontError::Config(format!("Unknown log format: {other}"))),
        }
    }
}

/// Install the global subscriber.
///
/// # Errors
/// Returns `StorefrontError::Config` if a global subscriber is already set.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer().with_target(true)), None),
        LogFormat::Json => {
            (None, Some(tracing_subscriber::fmt::layer().json().flatten_event(true)))
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty)
        .with(json)
        .try_init()
        .map_err(|e| StorefrontError::Config(format!("Failed to init subscriber: {e}")))?;

    tracing::debug!(?format, "logging initialised");
    Ok(())
}
