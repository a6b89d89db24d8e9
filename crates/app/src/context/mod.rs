//! Application context - dependency injection container
//!
//! Builds one [`EntityCache`] per entity family from the configured TTLs,
//! puts a read-through service in front of each store, and wires the order
//! placement coordinator over the atomic unit of work. All caches report to
//! one shared metrics sink and all store calls to one [`QueryTimings`].

mod janitor;
mod ports;

use std::fmt::Write as _;
use std::sync::Arc;

use storefront_common::cache::{
    CacheConfig, CacheMetricsSink, CacheStats, EntityCache, RecordingMetricsSink,
};
use storefront_core::{
    ApplicationLogStore, CategoryService, Entity, EntityService, IdCache, InventoryService,
    OrderCreationCoordinator, OrderService, PersistentStore, ProductService, QueryTimings,
    ReviewService, UserService,
};
use storefront_domain::{
    Category, Config, EntityKind, InventoryRecord, Order, Product, Result, Review, User,
};
use storefront_infra::{map_join_error, DbManager, SCHEMA_VERSION};
use tracing::{info, warn};

pub use janitor::JanitorHandle;
pub use ports::{
    DynApplicationLogStore, DynAtomicStore, DynCategoryStore, DynInventoryStore, DynOrderStore,
    DynProductStore, DynReviewStore, DynUserStore, StorePorts,
};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Cache name for the per-product review lists
pub const REVIEWS_BY_PRODUCT_CACHE: &str = "reviews_by_product";

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    /// Present when the context runs over SQLite
    pub db: Option<Arc<DbManager>>,

    // Per-family services
    pub products: Arc<ProductService>,
    pub categories: Arc<CategoryService>,
    pub users: Arc<UserService>,
    pub orders: Arc<OrderService>,
    pub inventory: Arc<InventoryService>,
    pub reviews: Arc<ReviewService>,

    pub coordinator: Arc<OrderCreationCoordinator>,
    pub logs: Arc<DynApplicationLogStore>,

    // Shared instrumentation
    pub metrics: Arc<RecordingMetricsSink>,
    pub timings: Arc<QueryTimings>,
}

impl AppContext {
    /// Open the configured database, apply migrations and wire the context
    pub async fn open(config: Config) -> Result<Self> {
        let path = config.database.path.clone();
        let pool_size = config.database.pool_size;

        let db = tokio::task::spawn_blocking(move || -> Result<DbManager> {
            let db = DbManager::new(&path, pool_size)?;
            db.run_migrations()?;
            Ok(db)
        })
        .await
        .map_err(map_join_error)??;

        info!(path = %config.database.path, schema_version = SCHEMA_VERSION, "database ready");
        Ok(Self::new(config, Arc::new(db)))
    }

    /// Wire the context over an already migrated SQLite database
    pub fn new(config: Config, db: Arc<DbManager>) -> Self {
        let ports = StorePorts::sqlite(&db);
        let mut context = Self::with_stores(config, ports);
        context.db = Some(db);
        context
    }

    /// Wire the context over arbitrary store implementations
    pub fn with_stores(config: Config, ports: StorePorts) -> Self {
        let metrics = Arc::new(RecordingMetricsSink::new());
        let timings = Arc::new(QueryTimings::new());
        let sink: Arc<dyn CacheMetricsSink> = metrics.clone();

        let logs: Arc<dyn ApplicationLogStore> = ports.logs.clone();
        let builder = ServiceBuilder { config: &config, sink: &sink, timings: &timings, logs: &logs };

        let products = Arc::new(ProductService::new(
            builder.service::<Product>(EntityKind::Product, ports.products),
        ));
        let categories = Arc::new(CategoryService::new(
            builder.service::<Category>(EntityKind::Category, ports.categories),
        ));
        let users =
            Arc::new(UserService::new(builder.service::<User>(EntityKind::User, ports.users)));
        let orders =
            Arc::new(OrderService::new(builder.service::<Order>(EntityKind::Order, ports.orders)));
        let inventory = Arc::new(
            InventoryService::new(
                builder.service::<InventoryRecord>(EntityKind::Inventory, ports.inventory),
                ports.atomic.clone(),
            )
            .with_timeout(config.store.timeout()),
        );
        let reviews = Arc::new(ReviewService::new(
            builder.service::<Review>(EntityKind::Review, ports.reviews),
            builder.cache(REVIEWS_BY_PRODUCT_CACHE, EntityKind::Review),
        ));

        let mut coordinator =
            OrderCreationCoordinator::new(ports.atomic.clone(), Arc::clone(&orders))
                .with_tax_rate(config.orders.tax_rate)
                .with_timeout(config.store.timeout());
        if config.orders.decrement_stock {
            coordinator = coordinator.with_stock_reservation(Arc::clone(&inventory));
        }

        info!(
            tax_rate = %config.orders.tax_rate,
            reserves_stock = coordinator.reserves_stock(),
            store_timeout_ms = config.store.timeout_ms,
            "application context wired"
        );

        Self {
            config,
            db: None,
            products,
            categories,
            users,
            orders,
            inventory,
            reviews,
            coordinator: Arc::new(coordinator),
            logs: ports.logs,
            metrics,
            timings,
        }
    }

    /// Statistics for every cache, in family order
    pub fn cache_stats(&self) -> Vec<CacheStats> {
        let mut stats = vec![
            self.products.entities().stats(),
            self.users.entities().stats(),
            self.orders.entities().stats(),
            self.inventory.entities().stats(),
            self.categories.entities().stats(),
        ];
        stats.extend(self.reviews.cache_stats());
        stats
    }

    /// Plain-text report of cache statistics and store round-trip timings
    pub fn cache_report(&self) -> String {
        let stats = self.cache_stats();
        let (hits, misses) =
            stats.iter().fold((0, 0), |(hits, misses), s| (hits + s.hits, misses + s.misses));

        let mut out = String::from("Cache statistics\n");
        for family in &stats {
            let _ = writeln!(out, "  {family}");
        }
        let _ = writeln!(out, "  total: hits={hits} misses={misses}");
        out.push_str("\nStore round-trips\n");
        out.push_str(&self.timings.report());
        out
    }

    /// Sweep expired entries out of every cache; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        self.products.entities().purge_expired()
            + self.users.entities().purge_expired()
            + self.orders.entities().purge_expired()
            + self.inventory.entities().purge_expired()
            + self.categories.entities().purge_expired()
            + self.reviews.purge_expired()
    }

    /// Drop everything cached for every family
    pub fn invalidate_all(&self) {
        self.products.entities().invalidate();
        self.users.entities().invalidate();
        self.orders.entities().invalidate();
        self.inventory.entities().invalidate();
        self.categories.entities().invalidate();
        self.reviews.invalidate();
        info!("all entity caches invalidated");
    }

    /// Start the expiry janitor at the configured interval
    ///
    /// Returns `None` when the interval is configured as zero.
    pub fn spawn_janitor(self: &Arc<Self>) -> Option<JanitorHandle> {
        let interval = self.config.cache.janitor_interval()?;
        Some(JanitorHandle::spawn(Arc::clone(self), interval))
    }

    /// Database reachability plus a summary line per cache
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new().add_component(self.check_database_health().await);

        for stats in self.cache_stats() {
            let summary =
                format!("{} ids, hit rate {:.1}%", stats.cached_ids, stats.hit_rate() * 100.0);
            status =
                status.add_component(ComponentHealth::healthy(stats.name).with_message(summary));
        }

        status.calculate_score();
        status
    }

    async fn check_database_health(&self) -> ComponentHealth {
        let Some(db) = self.db.clone() else {
            return ComponentHealth::healthy("database").with_message("external stores");
        };

        match tokio::task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(())) => ComponentHealth::healthy("database"),
            Ok(Err(err)) => {
                warn!(error = %err, "database health check failed");
                ComponentHealth::unhealthy("database", format!("query failed: {err}"))
            }
            Err(err) => {
                warn!(error = %err, "database health check task panicked");
                ComponentHealth::unhealthy("database", format!("task panic: {err}"))
            }
        }
    }

    /// Log final cache statistics and drop cached state
    ///
    /// The connection pool closes when the last `Arc<DbManager>` drops; a
    /// running janitor stops when its handle drops.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");

        for stats in self.cache_stats() {
            info!(
                cache = %stats.name,
                hits = stats.hits,
                misses = stats.misses,
                invalidations = stats.invalidations,
                "cache_final_stats"
            );
        }
        self.invalidate_all();

        if let Some(db) = &self.db {
            info!(path = %db.path().display(), "database_cleanup");
        }
        Ok(())
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

/// Shared ingredients for every family service
struct ServiceBuilder<'a> {
    config: &'a Config,
    sink: &'a Arc<dyn CacheMetricsSink>,
    timings: &'a Arc<QueryTimings>,
    logs: &'a Arc<dyn ApplicationLogStore>,
}

impl ServiceBuilder<'_> {
    fn cache<V: Clone>(&self, name: &'static str, kind: EntityKind) -> EntityCache<i64, V> {
        EntityCache::new(name, CacheConfig::ttl(self.config.cache.ttl_for(kind)))
            .with_sink(Arc::clone(self.sink))
    }

    fn service<T: Entity>(
        &self,
        kind: EntityKind,
        store: Arc<dyn PersistentStore<T>>,
    ) -> EntityService<T> {
        let cache: IdCache<T> = self.cache(kind.cache_name(), kind);
        EntityService::new(kind, store, cache)
            .with_timeout(self.config.store.timeout())
            .with_timings(Arc::clone(self.timings))
            .with_slow_query_log(Arc::clone(self.logs))
    }
}
