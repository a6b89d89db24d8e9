//! SQLite-backed order store.
//!
//! Orders are always returned with their line items. The insert helpers are
//! shared with the unit of work so both paths write identical rows.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use storefront_core::PersistentStore;
use storefront_domain::{Order, OrderLineItem, Result as DomainResult};

use super::columns::{decimal_at, parsed_at};
use super::manager::{run_blocking, with_transaction, DbManager};
use crate::errors::map_sql_error;

const ORDER_SELECT: &str = "SELECT order_id, user_id, status, total_amount, order_date FROM orders";
const ITEM_SELECT: &str =
    "SELECT order_item_id, order_id, product_id, quantity, unit_price FROM order_items";

/// SQLite implementation of PersistentStore for orders
pub struct SqliteOrderRepository {
    db: Arc<DbManager>,
}

impl SqliteOrderRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersistentStore<Order> for SqliteOrderRepository {
    async fn create(&self, order: &Order) -> DomainResult<i64> {
        let order = order.clone();
        run_blocking(&self.db, move |conn| {
            with_transaction(conn, |conn| {
                let order_id = insert_order(conn, &order)?;
                for item in &order.line_items {
                    insert_line_item(conn, order_id, item)?;
                }
                Ok(order_id)
            })
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<Option<Order>> {
        run_blocking(&self.db, move |conn| {
            let order = conn
                .query_row(&format!("{ORDER_SELECT} WHERE order_id = ?1"), params![id], map_order_row)
                .optional()
                .map_err(map_sql_error)?;

            let Some(mut order) = order else {
                return Ok(None);
            };

            let mut stmt = conn
                .prepare(&format!("{ITEM_SELECT} WHERE order_id = ?1 ORDER BY order_item_id"))
                .map_err(map_sql_error)?;
            order.line_items = stmt
                .query_map(params![id], map_line_item_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(Some(order))
        })
        .await
    }

    async fn get_all(&self) -> DomainResult<Vec<Order>> {
        run_blocking(&self.db, |conn| {
            let mut stmt =
                conn.prepare(&format!("{ORDER_SELECT} ORDER BY order_id")).map_err(map_sql_error)?;
            let mut orders = stmt
                .query_map([], map_order_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            let mut stmt = conn
                .prepare(&format!("{ITEM_SELECT} ORDER BY order_item_id"))
                .map_err(map_sql_error)?;
            let mut items_by_order: HashMap<i64, Vec<OrderLineItem>> = HashMap::new();
            for item in stmt.query_map([], map_line_item_row).map_err(map_sql_error)? {
                let item = item.map_err(map_sql_error)?;
                items_by_order.entry(item.order_id).or_default().push(item);
            }

            for order in &mut orders {
                order.line_items = items_by_order.remove(&order.id).unwrap_or_default();
            }
            Ok(orders)
        })
        .await
    }

    /// Writes status and total; line items are immutable once placed.
    async fn update(&self, order: &Order) -> DomainResult<bool> {
        let order = order.clone();
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute(
                    "UPDATE orders SET status = ?1, total_amount = ?2 WHERE order_id = ?3",
                    params![order.status.to_string(), order.total_amount.to_string(), order.id],
                )
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute("DELETE FROM orders WHERE order_id = ?1", params![id])
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }
}

/// Insert the order header row. Line items on `order` are not written.
pub(crate) fn insert_order(conn: &Connection, order: &Order) -> DomainResult<i64> {
    conn.execute(
        "INSERT INTO orders (user_id, status, total_amount, order_date) VALUES (?1, ?2, ?3, ?4)",
        params![
            order.user_id,
            order.status.to_string(),
            order.total_amount.to_string(),
            order.created_at
        ],
    )
    .map_err(map_sql_error)?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn insert_line_item(
    conn: &Connection,
    order_id: i64,
    item: &OrderLineItem,
) -> DomainResult<i64> {
    conn.execute(
        "INSERT INTO order_items (order_id, product_id, quantity, unit_price)
         VALUES (?1, ?2, ?3, ?4)",
        params![order_id, item.product_id, item.quantity, item.unit_price.to_string()],
    )
    .map_err(map_sql_error)?;
    Ok(conn.last_insert_rowid())
}

fn map_order_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        user_id: row.get(1)?,
        status: parsed_at(row, 2)?,
        total_amount: decimal_at(row, 3)?,
        created_at: row.get(4)?,
        line_items: Vec::new(),
    })
}

fn map_line_item_row(row: &Row<'_>) -> rusqlite::Result<OrderLineItem> {
    Ok(OrderLineItem {
        id: row.get(0)?,
        order_id: row.get(1)?,
        product_id: row.get(2)?,
        quantity: row.get(3)?,
        unit_price: decimal_at(row, 4)?,
    })
}
