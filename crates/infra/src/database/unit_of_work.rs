//! Atomic multi-row writes over one SQLite transaction.
//!
//! Steps run in order on a single connection between `BEGIN IMMEDIATE` and
//! `COMMIT`. The first failing step aborts the unit and rolls every earlier
//! step back; the failure is reported as `PartialWrite` carrying its index.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use storefront_core::{AtomicStore, CommitResult, WriteStep};
use storefront_domain::{Result as DomainResult, StorefrontError};
use tracing::{debug, info, warn};

use super::manager::{run_blocking, with_transaction, DbManager};
use super::order_repository::{insert_line_item, insert_order};
use crate::errors::map_sql_error;

/// Runs write steps inside one SQLite transaction
pub struct SqliteUnitOfWork {
    db: Arc<DbManager>,
}

impl SqliteUnitOfWork {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AtomicStore for SqliteUnitOfWork {
    async fn run_atomic(&self, steps: Vec<WriteStep>) -> CommitResult {
        let step_count = steps.len();
        let outcome =
            run_blocking(&self.db, move |conn| with_transaction(conn, |conn| apply_steps(conn, &steps)))
                .await;

        match outcome {
            Ok(ids) => {
                info!(steps = step_count, "atomic unit committed");
                CommitResult::Committed(ids)
            }
            Err(err) => {
                warn!(steps = step_count, error = %err, "atomic unit rolled back");
                CommitResult::RolledBack(err)
            }
        }
    }
}

fn apply_steps(conn: &Connection, steps: &[WriteStep]) -> DomainResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let id = apply_step(conn, steps, &ids, step).map_err(|err| {
            debug!(step = index, kind = step.label(), error = %err, "write step failed");
            StorefrontError::PartialWrite { step: index, reason: err.to_string() }
        })?;
        ids.push(id);
    }
    Ok(ids)
}

/// `ids` holds the ids produced by the steps before `step`.
fn apply_step(
    conn: &Connection,
    steps: &[WriteStep],
    ids: &[i64],
    step: &WriteStep,
) -> DomainResult<i64> {
    match step {
        WriteStep::CreateOrder(order) => insert_order(conn, order),
        WriteStep::CreateLineItem { order_step, item } => {
            let order_id = match (steps.get(*order_step), ids.get(*order_step)) {
                (Some(WriteStep::CreateOrder(_)), Some(id)) => *id,
                _ => {
                    return Err(StorefrontError::InvalidInput(format!(
                        "step {order_step} is not an earlier order insert"
                    )))
                }
            };
            insert_line_item(conn, order_id, item)
        }
        WriteStep::AdjustStock { product_id, delta } => {
            let changed = conn
                .execute(
                    "UPDATE inventory
                     SET quantity_available = quantity_available + ?1, last_updated = ?2
                     WHERE product_id = ?3 AND quantity_available + ?1 >= 0",
                    params![delta, Utc::now(), product_id],
                )
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(StorefrontError::Conflict(format!(
                    "insufficient stock or no inventory for product {product_id}"
                )));
            }
            Ok(*product_id)
        }
    }
}
