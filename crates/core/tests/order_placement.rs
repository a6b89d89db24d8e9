//! Integration tests for atomic order placement
//!
//! Exercises the coordinator against an in-memory unit of work that can be
//! told to fail at any step.

mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use storefront_core::{Cart, OrderCreationCoordinator, OrderService, SortOrder};
use storefront_domain::{InventoryRecord, OrderStatus, StorefrontError};
use support::{cart_line, money, OrderFixture, StalledUnitOfWork};

fn stock() -> Vec<InventoryRecord> {
    vec![InventoryRecord::new(1, 5), InventoryRecord::new(2, 1)]
}

// ============================================================================
// Commit
// ============================================================================

/// Test the canonical two-line order
///
/// # Test Steps
/// 1. Place `[{1, qty 2, 10.00}, {2, qty 1, 5.00}]`
/// 2. Verify subtotal 25.00 + tax 2.50 = total 27.50
/// 3. Verify exactly one order with two line items was persisted
#[tokio::test(flavor = "multi_thread")]
async fn test_two_line_order_commits() {
    let fixture = OrderFixture::new(stock());
    let coordinator = fixture.coordinator();

    let placement =
        coordinator.place_order(7, &[cart_line(1, 1_000, 2), cart_line(2, 500, 1)]).await;

    assert!(placement.success, "{}", placement.message);
    let order = placement.order.unwrap();
    assert_eq!(order.total_amount, money(2_750));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.line_items.len(), 2);
    assert!(order.line_items.iter().all(|item| item.order_id == order.id && item.id > 0));

    let rows = fixture.uow.orders.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].line_items.len(), 2);
    assert_eq!(rows[0].total_amount, money(2_750));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_commit_invalidates_order_cache() {
    let fixture = OrderFixture::new(stock());
    let coordinator = fixture.coordinator();
    assert!(fixture.orders.get_all().await.unwrap().is_empty());

    coordinator.place_order(7, &[cart_line(1, 1_000, 1)]).await;

    let orders = fixture.orders.get_all().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(fixture.uow.orders.get_all_calls(), 2);
}

// ============================================================================
// Rollback
// ============================================================================

/// Test a failure on the second line-item write
///
/// # Test Steps
/// 1. Warm the order snapshot
/// 2. Fail step 2 (order is step 0, line items are steps 1 and 2)
/// 3. Verify the placement failed, nothing was persisted and the cached
///    snapshot was left alone
#[tokio::test(flavor = "multi_thread")]
async fn test_failure_on_second_line_item_rolls_back() {
    let fixture = OrderFixture::new(stock());
    let coordinator = fixture.coordinator();
    fixture.orders.get_all().await.unwrap();
    fixture.uow.fail_at_step(2);

    let placement =
        coordinator.place_order(7, &[cart_line(1, 1_000, 2), cart_line(2, 500, 1)]).await;

    assert!(!placement.success);
    assert!(placement.order.is_none());
    assert!(placement.message.contains("step 2"));
    assert!(fixture.uow.orders.rows().is_empty());
    assert!(fixture.orders.entities().cache().has_valid_snapshot());
    assert_eq!(fixture.orders.entities().stats().invalidations, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rollback_reports_partial_write() {
    let fixture = OrderFixture::new(stock());
    fixture.uow.fail_at_step(1);

    let err = fixture
        .coordinator()
        .try_place_order(7, &[cart_line(1, 1_000, 1)])
        .await
        .unwrap_err();

    assert!(matches!(err, StorefrontError::PartialWrite { step: 1, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_cart_never_touches_store() {
    let fixture = OrderFixture::new(stock());

    let placement = fixture.coordinator().place_order(7, &[]).await;

    assert!(!placement.success);
    assert_eq!(placement.message, "Cart is empty");
    assert_eq!(fixture.uow.units_run(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_zero_quantity_line_is_rejected() {
    let fixture = OrderFixture::new(stock());

    let err = fixture
        .coordinator()
        .try_place_order(7, &[cart_line(1, 1_000, 0)])
        .await
        .unwrap_err();

    assert!(matches!(err, StorefrontError::InvalidInput(_)));
    assert_eq!(fixture.uow.units_run(), 0);
}

/// Test a unit that never answers in time
///
/// # Test Steps
/// 1. Warm the order snapshot
/// 2. Place an order through a unit of work that stalls for 3s, bounded by
///    a 50ms timeout
/// 3. Verify `Timeout` comes back promptly and the snapshot was dropped, so
///    a late commit cannot hide behind it
#[tokio::test(flavor = "multi_thread")]
async fn test_stalled_unit_times_out_and_drops_snapshot() {
    let fixture = OrderFixture::new(stock());
    let stalled = StalledUnitOfWork::new(Duration::from_secs(3));
    let coordinator = OrderCreationCoordinator::new(stalled.clone(), Arc::clone(&fixture.orders))
        .with_timeout(Duration::from_millis(50));
    fixture.orders.get_all().await.unwrap();
    assert!(fixture.orders.entities().cache().has_valid_snapshot());

    let started = Instant::now();
    let err = coordinator.try_place_order(7, &[cart_line(1, 1_000, 1)]).await.unwrap_err();

    assert!(matches!(err, StorefrontError::Timeout(_)), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(1), "took {:?}", started.elapsed());
    assert_eq!(stalled.units_run(), 1);
    assert!(!fixture.orders.entities().cache().has_valid_snapshot());
}

/// Test a commit that reports too few ids
///
/// # Test Steps
/// 1. Warm the order snapshot
/// 2. Place a one-line order through a unit that commits but reports no ids
/// 3. Verify the placement fails with `Internal` and the snapshot was still
///    dropped, since the rows were written
#[tokio::test(flavor = "multi_thread")]
async fn test_short_id_list_still_invalidates_orders() {
    let fixture = OrderFixture::new(stock());
    let committing = StalledUnitOfWork::committing(Duration::ZERO, vec![]);
    let coordinator = OrderCreationCoordinator::new(committing, Arc::clone(&fixture.orders));
    fixture.orders.get_all().await.unwrap();

    let err = coordinator.try_place_order(7, &[cart_line(1, 1_000, 1)]).await.unwrap_err();

    assert!(matches!(err, StorefrontError::Internal(_)), "{err:?}");
    assert!(!fixture.orders.entities().cache().has_valid_snapshot());
    assert_eq!(fixture.orders.entities().stats().invalidations, 1);
}

// ============================================================================
// Stock reservation
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_reservation_decrements_stock_and_invalidates_inventory() {
    let fixture = OrderFixture::new(stock());
    let coordinator = fixture.reserving_coordinator();
    assert!(fixture.inventory.in_stock(2).await.unwrap());

    let placement =
        coordinator.place_order(7, &[cart_line(1, 1_000, 2), cart_line(2, 500, 1)]).await;

    assert!(placement.success, "{}", placement.message);
    assert_eq!(fixture.inventory.get_by_product(1).await.unwrap().unwrap().quantity_available, 3);
    assert!(!fixture.inventory.in_stock(2).await.unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reservation_refuses_insufficient_stock() {
    let fixture = OrderFixture::new(stock());
    let coordinator = fixture.reserving_coordinator();

    // Two lines for the same product add up past what is on hand
    let placement =
        coordinator.place_order(7, &[cart_line(2, 500, 1), cart_line(2, 500, 1)]).await;

    assert!(!placement.success);
    assert_eq!(fixture.uow.units_run(), 0);
    assert!(fixture.uow.orders.rows().is_empty());
    assert_eq!(fixture.uow.inventory.rows()[1].quantity_available, 1);
}

// ============================================================================
// Cart checkout and order lifecycle
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_checkout_clears_cart_only_on_success() {
    let fixture = OrderFixture::new(stock());
    let coordinator = fixture.coordinator();
    let mut cart = Cart::new();
    cart.add(cart_line(1, 1_000, 1));

    fixture.uow.fail_at_step(0);
    assert!(!coordinator.checkout(7, &mut cart).await.success);
    assert_eq!(cart.item_count(), 1);

    let fixture = OrderFixture::new(stock());
    let placement = fixture.coordinator().checkout(7, &mut cart).await;
    assert!(placement.success);
    assert!(cart.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_lifecycle_and_revenue() {
    let fixture = OrderFixture::new(stock());
    let coordinator = fixture.coordinator();
    let first = coordinator.try_place_order(7, &[cart_line(1, 1_000, 1)]).await.unwrap();
    let second = coordinator.try_place_order(8, &[cart_line(2, 500, 2)]).await.unwrap();

    assert_eq!(fixture.orders.total_revenue().await.unwrap(), money(1_100 + 1_100));

    assert!(fixture.orders.update_status(second.id, OrderStatus::Cancelled).await.unwrap());
    assert_eq!(fixture.orders.total_revenue().await.unwrap(), money(1_100));

    let err = fixture.orders.update_status(second.id, OrderStatus::Shipped).await.unwrap_err();
    assert!(matches!(err, StorefrontError::InvalidInput(_)));

    assert!(!fixture.orders.update_status(999, OrderStatus::Shipped).await.unwrap());
    assert_eq!(fixture.orders.get_by_user(7).await.unwrap().len(), 1);
    assert_eq!(fixture.orders.get_by_status(OrderStatus::Pending).await.unwrap()[0].id, first.id);
    assert_eq!(fixture.orders.line_items(first.id).await.unwrap().len(), 1);
    assert_eq!(OrderService::status_options().len(), 5);

    let by_amount = fixture.orders.sort_by_amount(SortOrder::Descending).await.unwrap();
    assert_eq!(by_amount.len(), 2);
    assert_eq!(fixture.orders.recent(1).await.unwrap().len(), 1);
}
