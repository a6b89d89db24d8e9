//! Category service

use storefront_domain::constants::{ALL_CATEGORIES, UNKNOWN_CATEGORY};
use storefront_domain::{Category, Result};

use crate::entity::EntityService;

/// Product categories behind the category cache
pub struct CategoryService {
    entities: EntityService<Category>,
}

impl CategoryService {
    /// Wrap the read-through service for categories
    pub fn new(entities: EntityService<Category>) -> Self {
        Self { entities }
    }

    /// The underlying read-through service
    pub fn entities(&self) -> &EntityService<Category> {
        &self.entities
    }

    pub async fn get_all(&self) -> Result<Vec<Category>> {
        self.entities.get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        self.entities.get_by_id(id).await
    }

    /// Insert a category; blank names are rejected before the store
    pub async fn add(&self, category: &Category) -> Result<i64> {
        category.validate()?;
        self.entities.add(category).await
    }

    pub async fn update(&self, category: &Category) -> Result<bool> {
        category.validate()?;
        self.entities.update(category).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.entities.delete(id).await
    }

    /// `"All"` followed by every category name, for filter pickers
    pub async fn names_with_all(&self) -> Result<Vec<String>> {
        let categories = self.get_all().await?;
        let mut names = Vec::with_capacity(categories.len() + 1);
        names.push(ALL_CATEGORIES.to_string());
        names.extend(categories.into_iter().map(|c| c.name));
        Ok(names)
    }

    /// Display name for `category_id`, `"Unknown"` when it does not exist
    pub async fn name_for(&self, category_id: i64) -> Result<String> {
        Ok(self
            .get_by_id(category_id)
            .await?
            .map_or_else(|| UNKNOWN_CATEGORY.to_string(), |c| c.name))
    }

    /// Direct children of `parent_id`
    pub async fn children_of(&self, parent_id: i64) -> Result<Vec<Category>> {
        let mut categories = self.get_all().await?;
        categories.retain(|c| c.parent_id == Some(parent_id));
        Ok(categories)
    }
}
