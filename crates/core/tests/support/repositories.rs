//! In-memory store implementations for testing
//!
//! Every store counts its calls and can be told to fail or to stall, so
//! tests can assert exactly how often the cache layer reaches the store and
//! what happens when it misbehaves.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use storefront_core::{ApplicationLogStore, AtomicStore, CommitResult, PersistentStore, WriteStep};
use storefront_domain::{
    ApplicationLog, Category, Identified, InventoryRecord, LogLevel, Order, Product,
    Result as DomainResult, Review, StorefrontError, User,
};

/// Rows the in-memory store can hold
pub trait Row: Identified + Clone + Send + Sync + 'static {
    fn assign_id(&mut self, id: i64);
}

macro_rules! impl_row {
    ($($ty:ty),+ $(,)?) => {
        $(impl Row for $ty {
            fn assign_id(&mut self, id: i64) {
                self.id = id;
            }
        })+
    };
}

impl_row!(Product, Category, User, InventoryRecord, Review, Order);

#[derive(Debug, Clone)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: BTreeMap::new(), next_id: 1 }
    }
}

/// Call-counting, failure-injecting `PersistentStore`.
pub struct MemoryStore<T: Row> {
    table: Mutex<Table<T>>,
    get_all_calls: AtomicUsize,
    get_by_id_calls: AtomicUsize,
    write_calls: AtomicUsize,
    failure: Mutex<Option<StorefrontError>>,
    read_latency: Mutex<Option<Duration>>,
}

impl<T: Row> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            table: Mutex::new(Table::default()),
            get_all_calls: AtomicUsize::new(0),
            get_by_id_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            failure: Mutex::new(None),
            read_latency: Mutex::new(None),
        }
    }
}

impl<T: Row> MemoryStore<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A store seeded with `rows`; ids are assigned in order starting at 1
    pub fn seeded(rows: Vec<T>) -> Arc<Self> {
        let store = Self::default();
        {
            let mut table = store.table.lock();
            for mut row in rows {
                let id = table.next_id;
                table.next_id += 1;
                row.assign_id(id);
                table.rows.insert(id, row);
            }
        }
        Arc::new(store)
    }

    pub fn get_all_calls(&self) -> usize {
        self.get_all_calls.load(Ordering::SeqCst)
    }

    pub fn get_by_id_calls(&self) -> usize {
        self.get_by_id_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail with `err` until cleared
    pub fn fail_with(&self, err: StorefrontError) {
        *self.failure.lock() = Some(err);
    }

    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    /// Delay every read by `latency`
    pub fn set_read_latency(&self, latency: Duration) {
        *self.read_latency.lock() = Some(latency);
    }

    pub fn rows(&self) -> Vec<T> {
        self.table.lock().rows.values().cloned().collect()
    }

    pub fn row(&self, id: i64) -> Option<T> {
        self.table.lock().rows.get(&id).cloned()
    }

    /// Change a row behind the cache's back
    pub fn overwrite(&self, row: T) {
        self.table.lock().rows.insert(row.id(), row);
    }

    fn check(&self) -> DomainResult<()> {
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn stall(&self) {
        let latency = *self.read_latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl<T: Row> PersistentStore<T> for MemoryStore<T> {
    async fn create(&self, entity: &T) -> DomainResult<i64> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut table = self.table.lock();
        let id = table.next_id;
        table.next_id += 1;
        let mut row = entity.clone();
        row.assign_id(id);
        table.rows.insert(id, row);
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<Option<T>> {
        self.get_by_id_calls.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        self.check()?;
        Ok(self.row(id))
    }

    async fn get_all(&self) -> DomainResult<Vec<T>> {
        self.get_all_calls.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        self.check()?;
        Ok(self.rows())
    }

    async fn update(&self, entity: &T) -> DomainResult<bool> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut table = self.table.lock();
        match table.rows.get_mut(&entity.id()) {
            Some(row) => {
                *row = entity.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.table.lock().rows.remove(&id).is_some())
    }
}

/// Atomic unit of work over in-memory order and inventory tables.
///
/// Steps are applied to staged copies; the copies replace the live tables
/// only when every step succeeded.
pub struct MemoryUnitOfWork {
    pub orders: Arc<MemoryStore<Order>>,
    pub inventory: Arc<MemoryStore<InventoryRecord>>,
    next_line_id: Mutex<i64>,
    fail_at_step: Mutex<Option<usize>>,
    units: AtomicUsize,
}

impl MemoryUnitOfWork {
    pub fn new(
        orders: Arc<MemoryStore<Order>>,
        inventory: Arc<MemoryStore<InventoryRecord>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            orders,
            inventory,
            next_line_id: Mutex::new(1),
            fail_at_step: Mutex::new(None),
            units: AtomicUsize::new(0),
        })
    }

    /// Make the step at `index` fail in every following unit
    pub fn fail_at_step(&self, index: usize) {
        *self.fail_at_step.lock() = Some(index);
    }

    pub fn units_run(&self) -> usize {
        self.units.load(Ordering::SeqCst)
    }

    fn apply(
        &self,
        steps: &[WriteStep],
        orders: &mut Table<Order>,
        inventory: &mut Table<InventoryRecord>,
        next_line_id: &mut i64,
    ) -> Result<Vec<i64>, StorefrontError> {
        let fail_at = *self.fail_at_step.lock();
        let mut ids = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            let partial = |reason: String| StorefrontError::PartialWrite { step: index, reason };
            if fail_at == Some(index) {
                return Err(partial("injected failure".into()));
            }

            match step {
                WriteStep::CreateOrder(order) => {
                    let id = orders.next_id;
                    orders.next_id += 1;
                    let mut row = order.clone();
                    row.id = id;
                    row.line_items.clear();
                    orders.rows.insert(id, row);
                    ids.push(id);
                }
                WriteStep::CreateLineItem { order_step, item } => {
                    let order_id = ids
                        .get(*order_step)
                        .copied()
                        .ok_or_else(|| partial(format!("no step {order_step} to reference")))?;
                    let order = orders
                        .rows
                        .get_mut(&order_id)
                        .ok_or_else(|| partial(format!("order {order_id} missing")))?;
                    let mut row = item.clone();
                    row.id = *next_line_id;
                    row.order_id = order_id;
                    *next_line_id += 1;
                    ids.push(row.id);
                    order.line_items.push(row);
                }
                WriteStep::AdjustStock { product_id, delta } => {
                    let record = inventory
                        .rows
                        .values_mut()
                        .find(|r| r.product_id == *product_id)
                        .ok_or_else(|| partial(format!("no inventory for product {product_id}")))?;
                    let next = record.quantity_available + delta;
                    if next < 0 {
                        return Err(partial(format!("insufficient stock for product {product_id}")));
                    }
                    record.quantity_available = next;
                    ids.push(*product_id);
                }
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl AtomicStore for MemoryUnitOfWork {
    async fn run_atomic(&self, steps: Vec<WriteStep>) -> CommitResult {
        self.units.fetch_add(1, Ordering::SeqCst);
        if let Err(err) = self.orders.check() {
            return CommitResult::RolledBack(err);
        }

        let mut orders_table = self.orders.table.lock();
        let mut inventory_table = self.inventory.table.lock();
        let mut line_id = self.next_line_id.lock();

        let mut staged_orders = orders_table.clone();
        let mut staged_inventory = inventory_table.clone();
        let mut staged_line_id = *line_id;

        match self.apply(&steps, &mut staged_orders, &mut staged_inventory, &mut staged_line_id) {
            Ok(ids) => {
                *orders_table = staged_orders;
                *inventory_table = staged_inventory;
                *line_id = staged_line_id;
                CommitResult::Committed(ids)
            }
            Err(err) => CommitResult::RolledBack(err),
        }
    }
}

/// `ApplicationLogStore` backed by a vector
#[derive(Default)]
pub struct MemoryLogStore {
    events: Mutex<Vec<ApplicationLog>>,
    append_latency: Mutex<Option<Duration>>,
}

impl MemoryLogStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ApplicationLog> {
        self.events.lock().clone()
    }

    /// Delay every append by `latency`
    pub fn set_append_latency(&self, latency: Duration) {
        *self.append_latency.lock() = Some(latency);
    }
}

#[async_trait]
impl ApplicationLogStore for MemoryLogStore {
    async fn append(&self, log: &ApplicationLog) -> DomainResult<i64> {
        let latency = *self.append_latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let mut events = self.events.lock();
        let mut event = log.clone();
        event.id = i64::try_from(events.len()).unwrap_or(i64::MAX) + 1;
        let id = event.id;
        events.push(event);
        Ok(id)
    }

    async fn by_level(&self, level: LogLevel) -> DomainResult<Vec<ApplicationLog>> {
        Ok(self.events.lock().iter().filter(|e| e.level == level).cloned().collect())
    }

    async fn recent(&self, limit: usize) -> DomainResult<Vec<ApplicationLog>> {
        Ok(self.events.lock().iter().rev().take(limit).cloned().collect())
    }
}

/// `AtomicStore` that stalls before answering
///
/// Stands in for a unit of work whose backend stopped answering. After the
/// stall it reports whatever `ids` it was built with.
pub struct StalledUnitOfWork {
    stall: Duration,
    ids: Vec<i64>,
    units: AtomicUsize,
}

impl StalledUnitOfWork {
    pub fn new(stall: Duration) -> Arc<Self> {
        Self::committing(stall, Vec::new())
    }

    /// Report `ids` as committed after `stall`
    pub fn committing(stall: Duration, ids: Vec<i64>) -> Arc<Self> {
        Arc::new(Self { stall, ids, units: AtomicUsize::new(0) })
    }

    pub fn units_run(&self) -> usize {
        self.units.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AtomicStore for StalledUnitOfWork {
    async fn run_atomic(&self, _steps: Vec<WriteStep>) -> CommitResult {
        self.units.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.stall).await;
        CommitResult::Committed(self.ids.clone())
    }
}
