// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Expense operations: normalization plus store calls, one transaction per
//! mutating call.
//!
//! Every mutation acquires a `rusqlite::Transaction` on the caller's
//! connection and commits only once all work succeeded. Any early return
//! drops the handle, which rolls the transaction back.

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{
    BatchCreated, Expense, ExpenseBatchCreate, ExpenseCreate, ExpenseFilter, ExpenseSummary,
    ExpenseUpdate, NewExpense,
};
use crate::normalize;
use crate::store;
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn create_expense(conn: &mut Connection, payload: &ExpenseCreate) -> ExpenseResult<Expense> {
    let new = normalize::normalize(payload)?;
    let tx = conn.transaction()?;
    let expense = store::insert(&tx, &new)?;
    tx.commit()?;
    info!(
        "created expense {} for user {} ({} {})",
        expense.id, expense.user_id, expense.amount, expense.category
    );
    Ok(expense)
}

pub fn create_expenses_batch(
    conn: &mut Connection,
    payload: &ExpenseBatchCreate,
) -> ExpenseResult<BatchCreated> {
    if payload.items.is_empty() {
        return Err(ExpenseError::validation("items required"));
    }
    let shared = normalize::normalize_shared(payload)?;
    let rows = payload
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            normalize::normalize_item(payload.user_id, &shared, item).map_err(|e| match e {
                ExpenseError::Validation(msg) => {
                    ExpenseError::Validation(format!("items[{}]: {}", i, msg))
                }
                other => other,
            })
        })
        .collect::<ExpenseResult<Vec<NewExpense>>>()?;

    let tx = conn.transaction()?;
    let mut created = Vec::with_capacity(rows.len());
    let mut total_amount = Decimal::ZERO;
    for row in &rows {
        let expense = store::insert(&tx, row)?;
        total_amount += expense.amount;
        created.push(expense);
    }
    tx.commit()?;

    info!(
        "created {} expenses for user {} (total {})",
        created.len(),
        payload.user_id,
        total_amount
    );
    Ok(BatchCreated {
        created,
        total_amount,
    })
}

pub fn get_expense(conn: &Connection, id: i64, user_id: Option<i64>) -> ExpenseResult<Expense> {
    store::get(conn, id, user_id)
}

pub fn list_expenses(conn: &Connection, filter: &ExpenseFilter) -> ExpenseResult<Vec<Expense>> {
    let rows = store::list(conn, filter)?;
    debug!(
        "listed {} expenses for user {} (category {:?}, {:?}..{:?})",
        rows.len(),
        filter.user_id,
        filter.category,
        filter.date_from,
        filter.date_to
    );
    Ok(rows)
}

pub fn update_expense(
    conn: &mut Connection,
    id: i64,
    payload: &ExpenseUpdate,
    user_id: Option<i64>,
) -> ExpenseResult<Expense> {
    let patch = normalize::normalize_update(payload)?;
    if patch.is_empty() {
        debug!("empty update for expense {}, refreshing updated_at only", id);
    }
    let tx = conn.transaction()?;
    let expense = store::update(&tx, id, &patch, user_id)?;
    tx.commit()?;
    info!("updated expense {}", expense.id);
    Ok(expense)
}

pub fn delete_expense(conn: &mut Connection, id: i64, user_id: Option<i64>) -> ExpenseResult<()> {
    let tx = conn.transaction()?;
    store::delete(&tx, id, user_id)?;
    tx.commit()?;
    info!("deleted expense {}", id);
    Ok(())
}

pub fn summarize_by_category(
    conn: &Connection,
    user_id: i64,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> ExpenseResult<Vec<ExpenseSummary>> {
    let totals = store::sum_by_category(conn, user_id, date_from, date_to)?;
    debug!("summarized {} categories for user {}", totals.len(), user_id);
    Ok(totals
        .into_iter()
        .map(|(category, total_amount)| ExpenseSummary {
            category,
            total_amount,
        })
        .collect())
}
