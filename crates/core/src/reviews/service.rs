//! Review service
//!
//! Besides the family cache, reviews keep a second cache of per-product
//! review lists. Both are cleared together on every write.

use storefront_common::cache::{CacheStats, EntityCache};
use storefront_domain::{Result, Review};
use tracing::debug;

use crate::entity::EntityService;
use crate::query::{sort_by_key, SortOrder};

/// Reviews with a per-product list cache on top of the family cache.
///
/// Neither cache is handed out: every write has to pass through here so the
/// per-product lists are dropped with it.
pub struct ReviewService {
    entities: EntityService<Review>,
    by_product: EntityCache<i64, Vec<Review>>,
}

impl ReviewService {
    /// Combine the family service with the per-product list cache
    pub fn new(entities: EntityService<Review>, by_product: EntityCache<i64, Vec<Review>>) -> Self {
        Self { entities, by_product }
    }

    /// Statistics of the family cache, then of the per-product cache
    pub fn cache_stats(&self) -> [CacheStats; 2] {
        [self.entities.stats(), self.by_product.stats()]
    }

    /// Sweep expired entries from both caches; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        self.entities.purge_expired() + self.by_product.cleanup_expired()
    }

    /// Drop everything cached in both caches
    pub fn invalidate(&self) {
        self.entities.invalidate();
        self.by_product.invalidate_all();
    }

    pub async fn get_all(&self) -> Result<Vec<Review>> {
        self.entities.get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Review>> {
        self.entities.get_by_id(id).await
    }

    /// Reviews of one product, cached per product id
    pub async fn for_product(&self, product_id: i64) -> Result<Vec<Review>> {
        if let Some(reviews) = self.by_product.get(&product_id) {
            return Ok(reviews);
        }

        let seen = self.by_product.generation();
        let mut reviews = self.entities.get_all().await?;
        reviews.retain(|r| r.product_id == product_id);
        if !self.by_product.put_if_current(seen, product_id, reviews.clone()) {
            debug!(product_id, "discarded review list raced by invalidation");
        }
        Ok(reviews)
    }

    /// Insert a review; ratings outside 1..=5 never reach the store
    pub async fn add(&self, review: &Review) -> Result<i64> {
        review.validate()?;
        let result = self.entities.add(review).await;
        self.after_write(&result);
        result
    }

    /// Replace a review and drop every per-product list
    pub async fn update(&self, review: &Review) -> Result<bool> {
        review.validate()?;
        let result = self.entities.update(review).await;
        self.after_write(&result);
        result
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = self.entities.delete(id).await;
        self.after_write(&result);
        result
    }

    /// Mean rating of a product; `None` when it has no reviews
    pub async fn average_rating(&self, product_id: i64) -> Result<Option<f64>> {
        let reviews = self.for_product(product_id).await?;
        if reviews.is_empty() {
            return Ok(None);
        }
        let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        Ok(Some(f64::from(total) / reviews.len() as f64))
    }

    /// Reviews of a product rated at least `min_rating`
    pub async fn high_rated(&self, product_id: i64, min_rating: u8) -> Result<Vec<Review>> {
        let mut reviews = self.for_product(product_id).await?;
        reviews.retain(|r| r.rating >= min_rating);
        Ok(reviews)
    }

    /// The `limit` newest reviews of a product
    pub async fn recent(&self, product_id: i64, limit: usize) -> Result<Vec<Review>> {
        let mut reviews = self.for_product(product_id).await?;
        sort_by_key(&mut reviews, SortOrder::Descending, |r| r.review_date);
        reviews.truncate(limit);
        Ok(reviews)
    }

    /// Reviews of a product ordered by rating
    pub async fn sort_by_rating(&self, product_id: i64, order: SortOrder) -> Result<Vec<Review>> {
        let mut reviews = self.for_product(product_id).await?;
        sort_by_key(&mut reviews, order, |r| r.rating);
        Ok(reviews)
    }

    fn after_write<R>(&self, result: &Result<R>) {
        if result.is_ok() {
            self.by_product.invalidate_all();
        }
    }
}
