// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use spendbook::db::init_schema;
use spendbook::error::ExpenseError;
use spendbook::models::{Category, ExpenseBatchCreate, ExpenseStatus};
use spendbook::service;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

fn count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM expenses", [], |r| r.get(0))
        .unwrap()
}

fn batch(v: serde_json::Value) -> ExpenseBatchCreate {
    serde_json::from_value(v).unwrap()
}

#[test]
fn heterogeneous_items_and_total() {
    let mut conn = setup();
    let payload = batch(json!({
        "user_id": 4,
        "category_label": "Supermercado",
        "transaction_date": "2025-05-02",
        "items": [
            {"name": "A", "total": 10},
            {"name": "B", "monto": 5, "cantidad": 2}
        ]
    }));
    let result = service::create_expenses_batch(&mut conn, &payload).unwrap();

    assert_eq!(result.created.len(), 2);
    assert_eq!(result.created[0].description.as_deref(), Some("A"));
    assert_eq!(result.created[0].amount, Decimal::from(10));
    assert_eq!(result.created[0].quantity, 1);
    assert_eq!(result.created[1].description.as_deref(), Some("B"));
    assert_eq!(result.created[1].amount, Decimal::from(10));
    assert_eq!(result.created[1].quantity, 2);
    assert_eq!(result.total_amount, Decimal::from(20));
    assert_eq!(result.total_amount.to_string(), "20.00");

    for e in &result.created {
        assert_eq!(e.user_id, 4);
        assert_eq!(e.category, Category::Food);
        assert_eq!(e.status, ExpenseStatus::Posted);
        assert_eq!(e.transaction_date.to_string(), "2025-05-02 00:00:00");
    }
    assert_eq!(count(&conn), 2);
}

#[test]
fn total_reflects_stored_precision() {
    let mut conn = setup();
    let payload = batch(json!({
        "user_id": 1,
        "items": [
            {"name": "x", "monto": "0.333", "cantidad": 3},
            {"name": "y", "total": "1.005"}
        ]
    }));
    let result = service::create_expenses_batch(&mut conn, &payload).unwrap();
    assert_eq!(result.created[0].amount.to_string(), "1.00");
    assert_eq!(result.created[1].amount.to_string(), "1.01");
    assert_eq!(result.total_amount.to_string(), "2.01");
}

#[test]
fn shared_fields_apply_to_every_item() {
    let mut conn = setup();
    let payload = batch(json!({
        "user_id": 2,
        "category": "SUBSCRIPTION",
        "status": "planned",
        "is_recurring": true,
        "items": [
            {"name": "Streaming", "total": "7.99", "payment_method": "credit", "cuotas": 1},
            {"name": "Música", "total": "4.99"}
        ]
    }));
    let result = service::create_expenses_batch(&mut conn, &payload).unwrap();
    assert!(result.created.iter().all(|e| e.category == Category::Subscription
        && e.status == ExpenseStatus::Planned
        && e.is_recurring));
    assert_eq!(result.created[0].payment_method.as_deref(), Some("credit"));
    assert_eq!(result.created[0].installments, Some(1));
    assert_eq!(result.created[1].installments, None);
    assert_eq!(
        result.created[0].transaction_date,
        result.created[1].transaction_date
    );
}

#[test]
fn empty_items_is_rejected_without_writes() {
    let mut conn = setup();
    let payload = batch(json!({"user_id": 1, "items": []}));
    let err = service::create_expenses_batch(&mut conn, &payload).unwrap_err();
    match err {
        ExpenseError::Validation(msg) => assert_eq!(msg, "items required"),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(count(&conn), 0);
}

#[test]
fn one_bad_item_aborts_the_whole_batch() {
    let mut conn = setup();
    let payload = batch(json!({
        "user_id": 1,
        "items": [
            {"name": "ok", "total": 3},
            {"name": "no amount"}
        ]
    }));
    let err = service::create_expenses_batch(&mut conn, &payload).unwrap_err();
    match err {
        ExpenseError::Validation(msg) => {
            assert!(msg.starts_with("items[1]"));
            assert!(msg.contains("amount required"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(count(&conn), 0);
}

#[test]
fn storage_failure_mid_batch_rolls_back() {
    let mut conn = setup();
    // Reject the second insert at the storage layer.
    conn.execute_batch(
        "CREATE TRIGGER reject_b BEFORE INSERT ON expenses
         WHEN NEW.description = 'B'
         BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    )
    .unwrap();
    let payload = batch(json!({
        "user_id": 1,
        "items": [
            {"name": "A", "total": 1},
            {"name": "B", "total": 2}
        ]
    }));
    let err = service::create_expenses_batch(&mut conn, &payload).unwrap_err();
    assert!(matches!(err, ExpenseError::Database(_)));
    assert_eq!(err.status_code(), 500);
    assert!(!err.is_client_error());
    assert_eq!(count(&conn), 0);
}

#[test]
fn unknown_shared_label_is_rejected() {
    let mut conn = setup();
    let payload = batch(json!({
        "user_id": 1,
        "category_label": "???",
        "items": [{"name": "A", "total": 1}]
    }));
    assert!(matches!(
        service::create_expenses_batch(&mut conn, &payload),
        Err(ExpenseError::Validation(_))
    ));
    assert_eq!(count(&conn), 0);
}

#[test]
fn created_rows_match_what_was_stored() {
    let mut conn = setup();
    let payload = batch(json!({
        "user_id": 3,
        "category": "food",
        "items": [
            {"name": "Pan", "monto": "1.115", "cantidad": 2},
            {"description": "Leche", "total": "0.99"}
        ]
    }));
    let result = service::create_expenses_batch(&mut conn, &payload).unwrap();
    let mut sum = Decimal::ZERO;
    for e in &result.created {
        assert_eq!(*e, service::get_expense(&conn, e.id, Some(3)).unwrap());
        sum += e.amount;
    }
    assert_eq!(result.created[1].description.as_deref(), Some("Leche"));
    assert_eq!(result.total_amount, sum);
    assert_eq!(result.total_amount.to_string(), "3.22");
}

#[test]
fn item_without_name_reports_the_wire_field() {
    let err = serde_json::from_value::<ExpenseBatchCreate>(json!({
        "user_id": 1,
        "items": [{"total": 5}]
    }))
    .unwrap_err();
    assert!(err.to_string().contains("missing field `name`"));
}
