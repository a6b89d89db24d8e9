//! Product catalogue service
//!
//! Every query here is answered from the product snapshot; none of them reach
//! the store while the snapshot is valid.

use rust_decimal::Decimal;
use storefront_domain::constants::ALL_CATEGORIES;
use storefront_domain::{Product, Result, StorefrontError};

use crate::entity::EntityService;
use crate::query::{contains_ignore_case, sort_by_key, SortOrder};

/// Catalogue queries answered from the product cache
pub struct ProductService {
    entities: EntityService<Product>,
}

impl ProductService {
    /// Wrap the read-through service for products
    pub fn new(entities: EntityService<Product>) -> Self {
        Self { entities }
    }

    /// The underlying read-through service
    pub fn entities(&self) -> &EntityService<Product> {
        &self.entities
    }

    pub async fn get_all(&self) -> Result<Vec<Product>> {
        self.entities.get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Product>> {
        self.entities.get_by_id(id).await
    }

    /// Insert a product after validating name and price
    pub async fn add(&self, product: &Product) -> Result<i64> {
        product.validate()?;
        self.entities.add(product).await
    }

    /// Replace a product; `false` when the id is unknown
    pub async fn update(&self, product: &Product) -> Result<bool> {
        product.validate()?;
        self.entities.update(product).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.entities.delete(id).await
    }

    /// Products whose name contains `term`, ignoring case
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<Product>> {
        let mut products = self.get_all().await?;
        products.retain(|p| contains_ignore_case(&p.name, term));
        Ok(products)
    }

    /// Products in `category_id`
    pub async fn filter_by_category(&self, category_id: i64) -> Result<Vec<Product>> {
        let mut products = self.get_all().await?;
        products.retain(|p| p.category_id == category_id);
        Ok(products)
    }

    /// Products priced within `[min, max]`
    pub async fn filter_by_price_range(&self, min: Decimal, max: Decimal) -> Result<Vec<Product>> {
        if min > max {
            return Err(StorefrontError::InvalidInput(format!(
                "price range is inverted: {min} > {max}"
            )));
        }
        let mut products = self.get_all().await?;
        products.retain(|p| p.price >= min && p.price <= max);
        Ok(products)
    }

    /// Name search combined with a category-name filter; `"All"` (any case)
    /// disables the category filter
    pub async fn search_and_filter(&self, term: &str, category: &str) -> Result<Vec<Product>> {
        let mut products = self.search_by_name(term).await?;
        if !category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            products.retain(|p| {
                p.category_name.as_deref().is_some_and(|name| name.eq_ignore_ascii_case(category))
            });
        }
        Ok(products)
    }

    pub async fn sort_by_price(&self, order: SortOrder) -> Result<Vec<Product>> {
        let mut products = self.get_all().await?;
        sort_by_key(&mut products, order, |p| p.price);
        Ok(products)
    }

    pub async fn sort_by_name(&self, order: SortOrder) -> Result<Vec<Product>> {
        let mut products = self.get_all().await?;
        sort_by_key(&mut products, order, |p| p.name.clone());
        Ok(products)
    }

    /// Products with fewer than `threshold` units on hand, scarcest first
    pub async fn low_stock(&self, threshold: i64) -> Result<Vec<Product>> {
        let mut products = self.get_all().await?;
        products.retain(|p| p.quantity_available < threshold);
        sort_by_key(&mut products, SortOrder::Ascending, |p| p.quantity_available);
        Ok(products)
    }
}
