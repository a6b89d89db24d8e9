//! Atomic order placement.
//!
//! Placing an order is one externally visible operation:
//!
//! 1. Reject an empty cart before touching the store
//! 2. Compute subtotal, tax and total from the cart lines
//! 3. Build one pending order plus one line item per cart line (and, when
//!    stock reservation is wired, one stock decrement per product)
//! 4. Hand every write to the store as a single atomic unit
//! 5. Only after the unit commits, invalidate the order cache (and the
//!    inventory cache when stock was reserved)
//!
//! A rolled-back unit leaves every cache untouched.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use storefront_common::time::run_with_deadline;
use storefront_domain::constants::STORE_TIMEOUT_MS;
use storefront_domain::money::default_tax_rate;
use storefront_domain::{
    CartLine, Order, OrderLineItem, OrderTotals, Result, StorefrontError,
};
use tracing::{info, warn};

use super::cart::Cart;
use super::service::OrderService;
use crate::inventory::InventoryService;
use crate::store_ports::{AtomicStore, CommitResult, WriteStep};

/// Outcome of [`OrderCreationCoordinator::place_order`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPlacement {
    pub success: bool,
    /// Human-readable outcome, e.g. "Cart is empty"
    pub message: String,
    /// The committed order with store-assigned ids, on success
    pub order: Option<Order>,
}

impl OrderPlacement {
    fn placed(order: Order) -> Self {
        Self { success: true, message: "Order placed successfully".into(), order: Some(order) }
    }

    fn failed(err: &StorefrontError) -> Self {
        let message = match err {
            StorefrontError::EmptyCart => "Cart is empty".to_string(),
            other => format!("Failed to create order: {other}"),
        };
        Self { success: false, message, order: None }
    }
}

/// Places orders as single atomic units over the store.
///
/// Holds the order service whose cache it invalidates after a commit, and
/// optionally the inventory service when stock reservation is enabled.
pub struct OrderCreationCoordinator {
    atomic: Arc<dyn AtomicStore>,
    orders: Arc<OrderService>,
    inventory: Option<Arc<InventoryService>>,
    tax_rate: Decimal,
    timeout: Duration,
}

impl OrderCreationCoordinator {
    /// A coordinator with the default tax rate, no stock reservation and the
    /// default store timeout
    pub fn new(atomic: Arc<dyn AtomicStore>, orders: Arc<OrderService>) -> Self {
        Self {
            atomic,
            orders,
            inventory: None,
            tax_rate: default_tax_rate(),
            timeout: Duration::from_millis(STORE_TIMEOUT_MS),
        }
    }

    /// Tax applied to the subtotal of every order
    #[must_use]
    pub fn with_tax_rate(mut self, tax_rate: Decimal) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    /// Reserve stock as part of every order: availability is checked up
    /// front and the decrements join the order's atomic unit
    #[must_use]
    pub fn with_stock_reservation(mut self, inventory: Arc<InventoryService>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// Bound every order unit by `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Tax rate applied to new orders
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Whether orders decrement stock in the same unit
    pub fn reserves_stock(&self) -> bool {
        self.inventory.is_some()
    }

    /// Place an order and report the outcome as a flat result
    pub async fn place_order(&self, user_id: i64, lines: &[CartLine]) -> OrderPlacement {
        match self.try_place_order(user_id, lines).await {
            Ok(order) => OrderPlacement::placed(order),
            Err(err) => OrderPlacement::failed(&err),
        }
    }

    /// Place an order for the contents of `cart`; the cart is emptied only
    /// when the order commits
    pub async fn checkout(&self, user_id: i64, cart: &mut Cart) -> OrderPlacement {
        let placement = self.place_order(user_id, cart.lines()).await;
        if placement.success {
            cart.clear();
        }
        placement
    }

    /// Place an order, returning the committed order with its ids
    pub async fn try_place_order(&self, user_id: i64, lines: &[CartLine]) -> Result<Order> {
        if lines.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }

        let totals = OrderTotals::from_lines(lines, self.tax_rate);
        let items: Vec<OrderLineItem> = lines.iter().map(OrderLineItem::from_cart_line).collect();
        for item in &items {
            item.validate()?;
        }
        let order = Order::pending(user_id, totals.total, items);

        let reservations = match &self.inventory {
            Some(inventory) => self.check_stock(inventory, &order).await?,
            None => Vec::new(),
        };

        let steps = Self::build_steps(&order, &reservations);
        let ids = self.commit(steps).await?;

        // Rows are in the store from here on, whatever the ids look like
        self.orders.entities().invalidate();
        if let (Some(inventory), false) = (&self.inventory, reservations.is_empty()) {
            inventory.entities().invalidate();
        }
        let placed = Self::stamp_ids(order, &ids)?;

        info!(
            order_id = placed.id,
            user_id,
            lines = placed.line_items.len(),
            subtotal = %totals.subtotal,
            tax = %totals.tax,
            total = %totals.total,
            "order committed"
        );
        Ok(placed)
    }

    /// Units requested per product, refusing the order when any product
    /// lacks stock
    async fn check_stock(
        &self,
        inventory: &InventoryService,
        order: &Order,
    ) -> Result<Vec<(i64, i64)>> {
        let mut wanted: BTreeMap<i64, i64> = BTreeMap::new();
        for item in &order.line_items {
            *wanted.entry(item.product_id).or_default() += i64::from(item.quantity);
        }

        for (&product_id, &quantity) in &wanted {
            if !inventory.has_enough_stock(product_id, quantity).await? {
                return Err(StorefrontError::InvalidInput(format!(
                    "insufficient stock for product {product_id}: {quantity} requested"
                )));
            }
        }
        Ok(wanted.into_iter().collect())
    }

    fn build_steps(order: &Order, reservations: &[(i64, i64)]) -> Vec<WriteStep> {
        let mut steps = Vec::with_capacity(1 + order.line_items.len() + reservations.len());
        steps.push(WriteStep::CreateOrder(Order { line_items: Vec::new(), ..order.clone() }));
        steps.extend(
            order
                .line_items
                .iter()
                .map(|item| WriteStep::CreateLineItem { order_step: 0, item: item.clone() }),
        );
        steps.extend(
            reservations
                .iter()
                .map(|&(product_id, quantity)| WriteStep::AdjustStock { product_id, delta: -quantity }),
        );
        steps
    }

    async fn commit(&self, steps: Vec<WriteStep>) -> Result<Vec<i64>> {
        let step_count = steps.len();
        let outcome =
            run_with_deadline("orders.run_atomic", self.timeout, self.atomic.run_atomic(steps))
                .await;

        match outcome {
            Ok(CommitResult::Committed(ids)) => Ok(ids),
            Ok(CommitResult::RolledBack(err)) => {
                warn!(steps = step_count, error = %err, "order unit rolled back");
                Err(err)
            }
            Err(deadline) => {
                // The unit may still commit after we stop waiting; dropping the
                // cached orders keeps a late commit from hiding behind them.
                self.orders.entities().invalidate();
                if let Some(inventory) = &self.inventory {
                    inventory.entities().invalidate();
                }
                Err(StorefrontError::Timeout(deadline.to_string()))
            }
        }
    }

    /// Copy the ids the store assigned onto the order and its line items
    fn stamp_ids(mut order: Order, ids: &[i64]) -> Result<Order> {
        let expected = 1 + order.line_items.len();
        if ids.len() < expected {
            return Err(StorefrontError::Internal(format!(
                "store reported {} ids for {expected} order writes",
                ids.len()
            )));
        }
        order.id = ids[0];
        for (item, &id) in order.line_items.iter_mut().zip(&ids[1..expected]) {
            item.id = id;
            item.order_id = order.id;
        }
        Ok(order)
    }
}
