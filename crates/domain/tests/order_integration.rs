//! Integration tests for order and cart types
//!
//! Covers totals computed from cart lines, status round-trips through their
//! wire form, and the JSON shape of errors and log events.

use rust_decimal::Decimal;
use storefront_domain::money::default_tax_rate;
use storefront_domain::{
    ApplicationLog, CartLine, EntityKind, LogKind, LogLevel, Order, OrderLineItem, OrderStatus,
    OrderTotals, StorefrontError,
};

// ============================================================================
// Order Totals
// ============================================================================

/// Test building a pending order from a two-line cart
///
/// # Test Steps
/// 1. Compute totals at the default tax rate
/// 2. Build unpersisted line items from the cart
/// 3. Verify the order total and line subtotals agree
#[test]
fn test_pending_order_from_cart() {
    let cart = vec![
        CartLine::new(1, "Teapot", Decimal::new(1000, 2), 2),
        CartLine::new(2, "Strainer", Decimal::new(500, 2), 1),
    ];
    let totals = OrderTotals::from_lines(&cart, default_tax_rate());
    let items: Vec<_> = cart.iter().map(OrderLineItem::from_cart_line).collect();
    let order = Order::pending(7, totals.total, items);

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Decimal::new(2750, 2));
    assert_eq!(order.line_items.len(), 2);
    assert_eq!(order.item_count(), 3);

    let line_sum: Decimal = order.line_items.iter().map(OrderLineItem::subtotal).sum();
    assert_eq!(line_sum, totals.subtotal);
}

#[test]
fn test_totals_round_half_away_from_zero() {
    // 3 x 3.35 = 10.05; 8% tax = 0.804 -> 0.80
    let cart = vec![CartLine::new(9, "Napkin", Decimal::new(335, 2), 3)];
    let totals = OrderTotals::from_lines(&cart, Decimal::new(8, 2));

    assert_eq!(totals.subtotal, Decimal::new(1005, 2));
    assert_eq!(totals.tax, Decimal::new(80, 2));
    assert_eq!(totals.total, Decimal::new(1085, 2));
}

#[test]
fn test_empty_cart_totals_are_zero() {
    let totals = OrderTotals::from_lines(&[], default_tax_rate());
    assert_eq!(totals.total, Decimal::ZERO);
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_order_json_uses_string_money_and_lowercase_status() {
    let order = Order::pending(1, Decimal::new(2750, 2), Vec::new());
    let json = serde_json::to_value(&order).unwrap();

    assert_eq!(json["status"], "pending");
    assert_eq!(json["total_amount"], "27.50");
}

#[test]
fn test_error_serializes_with_type_tag() {
    let err = StorefrontError::PartialWrite { step: 2, reason: "constraint".into() };
    let json = serde_json::to_value(&err).unwrap();

    assert_eq!(json["type"], "PartialWrite");
    assert_eq!(json["message"]["step"], 2);
    assert!(!err.is_retryable());
    assert!(StorefrontError::Timeout("get_all".into()).is_retryable());
}

#[test]
fn test_entity_change_log_round_trip() {
    let log = ApplicationLog::new(LogLevel::Info, "orders", "order placed").with_kind(
        LogKind::EntityChange {
            entity: EntityKind::Order,
            entity_id: 42,
            action: "create".into(),
            changed_fields: vec!["status".into()],
        },
    );

    let json = serde_json::to_string(&log).unwrap();
    let back: ApplicationLog = serde_json::from_str(&json).unwrap();

    assert_eq!(back, log);
    assert_eq!(back.kind.label(), "entity_change");
}
