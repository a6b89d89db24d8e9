//! Customer and staff accounts
//!
//! Credentials are owned by the authentication layer and never pass through
//! this type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StorefrontError};
use crate::impl_domain_status_conversions;
use crate::types::NEW_ID;

/// Access level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
}

impl_domain_status_conversions!(UserRole {
    Customer => "customer",
    Admin => "admin",
});

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A customer not yet persisted
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: NEW_ID,
            name: name.into(),
            email: email.into(),
            phone: None,
            address: None,
            role: UserRole::Customer,
            created_at: Utc::now(),
        }
    }

    /// Registration requires a name and a plausible email address
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(StorefrontError::InvalidInput("All fields are required.".into()));
        }
        let email = self.email.trim();
        let plausible = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !plausible {
            return Err(StorefrontError::InvalidInput(format!("invalid email address: {email}")));
        }
        Ok(())
    }

    /// Email normalised for comparisons
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}
