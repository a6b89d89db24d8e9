//! User service: cached lookups and registration

use storefront_domain::{Result, StorefrontError, User};
use tracing::info;

use crate::entity::EntityService;

/// Registered users behind the user cache
pub struct UserService {
    entities: EntityService<User>,
}

impl UserService {
    /// Wrap the read-through service for users
    pub fn new(entities: EntityService<User>) -> Self {
        Self { entities }
    }

    /// The underlying read-through service
    pub fn entities(&self) -> &EntityService<User> {
        &self.entities
    }

    pub async fn get_all(&self) -> Result<Vec<User>> {
        self.entities.get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        self.entities.get_by_id(id).await
    }

    /// Case-insensitive email lookup over the cached user list
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let wanted = email.trim().to_lowercase();
        Ok(self.get_all().await?.into_iter().find(|u| u.normalized_email() == wanted))
    }

    /// Insert a user without the duplicate-email check; see `register`
    pub async fn add(&self, user: &User) -> Result<i64> {
        user.validate()?;
        self.entities.add(user).await
    }

    pub async fn update(&self, user: &User) -> Result<bool> {
        user.validate()?;
        self.entities.update(user).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.entities.delete(id).await
    }

    /// Register a new account.
    ///
    /// Rejects missing fields and emails that are already registered; the
    /// store's unique constraint backs up the duplicate check.
    pub async fn register(&self, user: &User) -> Result<i64> {
        user.validate()?;
        if self.get_by_email(&user.email).await?.is_some() {
            return Err(StorefrontError::Conflict("Email already registered.".into()));
        }
        let id = self.entities.add(user).await?;
        info!(user_id = id, "user registered");
        Ok(id)
    }
}
