//! Catalogue types: products and the categories they belong to

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StorefrontError};
use crate::types::NEW_ID;

/// A sellable product
///
/// `category_name` and `quantity_available` are denormalised from the
/// category and inventory tables when the product is read; they are ignored
/// on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub quantity_available: i64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// A product that has not been persisted yet
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        category_id: i64,
    ) -> Self {
        Self {
            id: NEW_ID,
            name: name.into(),
            description: description.into(),
            price,
            category_id,
            category_name: None,
            quantity_available: 0,
            created_at: Utc::now(),
        }
    }

    /// Reject values the store would accept but the catalogue must not
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StorefrontError::InvalidInput("product name is required".into()));
        }
        if self.price.is_sign_negative() {
            return Err(StorefrontError::InvalidInput(format!(
                "product price must not be negative: {}",
                self.price
            )));
        }
        Ok(())
    }
}

/// A product category, optionally nested under a parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEW_ID,
            name: name.into(),
            description: None,
            parent_id: None,
            created_at: Utc::now(),
        }
    }

    /// Reject a blank name
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StorefrontError::InvalidInput("category name is required".into()));
        }
        if self.parent_id.is_some() && self.parent_id == Some(self.id) && self.id != NEW_ID {
            return Err(StorefrontError::InvalidInput(
                "category cannot be its own parent".into(),
            ));
        }
        Ok(())
    }
}
