//! Product reviews

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_RATING, MIN_RATING};
use crate::errors::{Result, StorefrontError};
use crate::types::NEW_ID;

/// A rating (1–5) with an optional comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub rating: u8,
    pub comment: Option<String>,
    pub review_date: DateTime<Utc>,
}

impl Review {
    /// A review not yet persisted, dated now
    pub fn new(user_id: i64, product_id: i64, rating: u8, comment: Option<String>) -> Self {
        Self { id: NEW_ID, user_id, product_id, rating, comment, review_date: Utc::now() }
    }

    /// Reject a rating outside the allowed range
    pub fn validate(&self) -> Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(StorefrontError::InvalidInput(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {}",
                self.rating
            )));
        }
        Ok(())
    }
}
