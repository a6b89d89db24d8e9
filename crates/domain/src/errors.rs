//! Error types used throughout the storefront

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for storefront operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum StorefrontError {
    /// The store could not be reached or refused the call
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A store call outlived its configured deadline
    #[error("Store call timed out: {0}")]
    Timeout(String),

    /// Order placement was attempted with no cart lines
    #[error("Cart is empty")]
    EmptyCart,

    /// A step inside an atomic unit failed; the whole unit was rolled back
    #[error("Atomic write failed at step {step}: {reason}")]
    PartialWrite { step: usize, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorefrontError {
    /// Whether the caller may reasonably try the same call again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Timeout(_))
    }

    /// Short, stable label for log fields and counters
    pub fn label(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Timeout(_) => "timeout",
            Self::EmptyCart => "empty_cart",
            Self::PartialWrite { .. } => "partial_write",
            Self::Database(_) => "database",
            Self::Conflict(_) => "conflict",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for storefront operations
pub type Result<T> = std::result::Result<T, StorefrontError>;
