//! Order queries and status management
//!
//! Orders are only ever created through
//! [`OrderCreationCoordinator`](super::OrderCreationCoordinator); this service
//! reads them and moves them through their status lifecycle.

use rust_decimal::Decimal;
use storefront_domain::{Order, OrderLineItem, OrderStatus, Result, StorefrontError};
use tracing::info;

use crate::entity::EntityService;
use crate::query::{sort_by_key, SortOrder};

/// Order queries and status changes behind the order cache
pub struct OrderService {
    entities: EntityService<Order>,
}

impl OrderService {
    /// Wrap the read-through service for orders
    pub fn new(entities: EntityService<Order>) -> Self {
        Self { entities }
    }

    /// The underlying read-through service
    pub fn entities(&self) -> &EntityService<Order> {
        &self.entities
    }

    pub async fn get_all(&self) -> Result<Vec<Order>> {
        self.entities.get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Order>> {
        self.entities.get_by_id(id).await
    }

    /// Every order placed by `user_id`
    pub async fn get_by_user(&self, user_id: i64) -> Result<Vec<Order>> {
        let mut orders = self.get_all().await?;
        orders.retain(|o| o.user_id == user_id);
        Ok(orders)
    }

    /// Orders currently in `status`
    pub async fn get_by_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        let mut orders = self.get_all().await?;
        orders.retain(|o| o.status == status);
        Ok(orders)
    }

    /// The `limit` most recently created orders, newest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<Order>> {
        let mut orders = self.sort_by_date(SortOrder::Descending).await?;
        orders.truncate(limit);
        Ok(orders)
    }

    /// Sum of order totals, cancelled orders excluded
    pub async fn total_revenue(&self) -> Result<Decimal> {
        Ok(self
            .get_all()
            .await?
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .map(|o| o.total_amount)
            .sum())
    }

    /// Orders by placement time
    pub async fn sort_by_date(&self, order: SortOrder) -> Result<Vec<Order>> {
        let mut orders = self.get_all().await?;
        sort_by_key(&mut orders, order, |o| o.created_at);
        Ok(orders)
    }

    pub async fn sort_by_amount(&self, order: SortOrder) -> Result<Vec<Order>> {
        let mut orders = self.get_all().await?;
        sort_by_key(&mut orders, order, |o| o.total_amount);
        Ok(orders)
    }

    /// Line items of one order; empty when the order does not exist
    pub async fn line_items(&self, order_id: i64) -> Result<Vec<OrderLineItem>> {
        Ok(self.get_by_id(order_id).await?.map(|o| o.line_items).unwrap_or_default())
    }

    /// Move an order to `status`.
    ///
    /// Returns `Ok(false)` when the order does not exist. Delivered and
    /// cancelled orders are final; asking to move them is an error.
    pub async fn update_status(&self, order_id: i64, status: OrderStatus) -> Result<bool> {
        let Some(mut order) = self.get_by_id(order_id).await? else {
            return Ok(false);
        };
        if order.status == status {
            return Ok(true);
        }
        if !order.status.can_transition_to(status) {
            return Err(StorefrontError::InvalidInput(format!(
                "order {order_id} cannot move from {} to {status}",
                order.status
            )));
        }

        let from = order.status;
        order.status = status;
        let updated = self.entities.update(&order).await?;
        if updated {
            info!(order_id, from = %from, to = %status, "order status changed");
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.entities.delete(id).await
    }

    /// Every status, in lifecycle order
    pub fn status_options() -> &'static [OrderStatus] {
        &OrderStatus::ALL
    }
}
