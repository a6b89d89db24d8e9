//! Shared test helpers for `storefront-core` integration tests.
//!
//! These helpers provide fixtures and wired-up services over the in-memory
//! stores so that tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod repositories;

use std::sync::Arc;

use rust_decimal::Decimal;
use storefront_common::cache::{CacheConfig, EntityCache};
use storefront_core::{
    CategoryService, Entity, EntityService, InventoryService, OrderCreationCoordinator,
    OrderService, PersistentStore, ProductService, ReviewService, UserService,
};
use storefront_domain::{
    CacheTtlConfig, CartLine, Category, EntityKind, InventoryRecord, Order, Product, Review,
    User,
};

pub use repositories::{MemoryLogStore, MemoryStore, MemoryUnitOfWork, Row, StalledUnitOfWork};

pub fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub fn product(name: &str, cents: i64, category_id: i64, quantity: i64) -> Product {
    let mut product = Product::new(name, format!("{name} description"), money(cents), category_id);
    product.quantity_available = quantity;
    product
}

pub fn cart_line(product_id: i64, cents: i64, quantity: u32) -> CartLine {
    CartLine::new(product_id, format!("product-{product_id}"), money(cents), quantity)
}

/// A cache with the default lifetime configured for `kind`
pub fn cache_for<T: Clone>(kind: EntityKind) -> EntityCache<i64, T> {
    EntityCache::new(kind.cache_name(), CacheConfig::ttl(CacheTtlConfig::default().ttl_for(kind)))
}

pub fn entity_service<T, S>(kind: EntityKind, store: Arc<S>) -> EntityService<T>
where
    T: Entity,
    S: PersistentStore<T> + 'static,
{
    EntityService::new(kind, store, cache_for(kind))
}

pub fn product_service(store: Arc<MemoryStore<Product>>) -> ProductService {
    ProductService::new(entity_service(EntityKind::Product, store))
}

pub fn category_service(store: Arc<MemoryStore<Category>>) -> CategoryService {
    CategoryService::new(entity_service(EntityKind::Category, store))
}

pub fn user_service(store: Arc<MemoryStore<User>>) -> UserService {
    UserService::new(entity_service(EntityKind::User, store))
}

pub fn review_service(store: Arc<MemoryStore<Review>>) -> ReviewService {
    ReviewService::new(entity_service(EntityKind::Review, store), cache_for(EntityKind::Review))
}

/// Order, inventory and placement services over one in-memory unit of work
pub struct OrderFixture {
    pub uow: Arc<MemoryUnitOfWork>,
    pub orders: Arc<OrderService>,
    pub inventory: Arc<InventoryService>,
}

impl OrderFixture {
    pub fn new(stock: Vec<InventoryRecord>) -> Self {
        let uow = MemoryUnitOfWork::new(MemoryStore::<Order>::new(), MemoryStore::seeded(stock));
        let orders = Arc::new(OrderService::new(entity_service(
            EntityKind::Order,
            Arc::clone(&uow.orders),
        )));
        let inventory = Arc::new(InventoryService::new(
            entity_service(EntityKind::Inventory, Arc::clone(&uow.inventory)),
            uow.clone(),
        ));
        Self { uow, orders, inventory }
    }

    pub fn coordinator(&self) -> OrderCreationCoordinator {
        OrderCreationCoordinator::new(self.uow.clone(), Arc::clone(&self.orders))
    }

    pub fn reserving_coordinator(&self) -> OrderCreationCoordinator {
        self.coordinator().with_stock_reservation(Arc::clone(&self.inventory))
    }
}
