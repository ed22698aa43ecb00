// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Row-level access to the `expenses` table.
//!
//! Functions take `&Connection`; a `rusqlite::Transaction` derefs to one, so
//! callers decide the transaction boundary.

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Category, Expense, ExpenseFilter, ExpensePatch, NewExpense};
use crate::utils::{day_end, day_start, format_ts, now_utc, parse_ts};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const COLUMNS: &str = "id, user_id, category, description, amount, quantity, installments, \
     payment_method, status, transaction_date, is_recurring, created_at, updated_at";

pub fn insert(conn: &Connection, e: &NewExpense) -> ExpenseResult<Expense> {
    let now = format_ts(&now_utc());
    conn.execute(
        "INSERT INTO expenses(user_id, category, description, amount, quantity, installments,
            payment_method, status, transaction_date, is_recurring, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            e.user_id,
            e.category,
            e.description,
            e.amount.to_string(),
            e.quantity,
            e.installments,
            e.payment_method,
            e.status,
            format_ts(&e.transaction_date),
            e.is_recurring,
            &now,
            &now
        ],
    )?;
    get(conn, conn.last_insert_rowid(), None)
}

pub fn get(conn: &Connection, id: i64, user_id: Option<i64>) -> ExpenseResult<Expense> {
    let mut sql = format!("SELECT {} FROM expenses WHERE id=?1", COLUMNS);
    let found = match user_id {
        Some(uid) => {
            sql.push_str(" AND user_id=?2");
            conn.query_row(&sql, params![id, uid], row_to_expense)
                .optional()?
        }
        None => conn.query_row(&sql, params![id], row_to_expense).optional()?,
    };
    found.ok_or(ExpenseError::NotFound)
}

pub fn list(conn: &Connection, filter: &ExpenseFilter) -> ExpenseResult<Vec<Expense>> {
    let mut sql = format!("SELECT {} FROM expenses WHERE user_id=?", COLUMNS);
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(filter.user_id)];

    if let Some(cat) = filter.category {
        sql.push_str(" AND category=?");
        args.push(Box::new(cat));
    }
    push_date_range(&mut sql, &mut args, filter.date_from, filter.date_to);
    sql.push_str(" ORDER BY transaction_date DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let refs: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();
    let rows = stmt.query_map(refs.as_slice(), row_to_expense)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(ExpenseError::from)
}

pub fn update(
    conn: &Connection,
    id: i64,
    patch: &ExpensePatch,
    user_id: Option<i64>,
) -> ExpenseResult<Expense> {
    let existing = get(conn, id, user_id)?;

    let mut sets: Vec<&str> = Vec::new();
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();
    if let Some(cat) = patch.category {
        sets.push("category=?");
        args.push(Box::new(cat));
    }
    if let Some(desc) = &patch.description {
        sets.push("description=?");
        args.push(Box::new(desc.clone()));
    }
    if let Some(amount) = patch.amount {
        sets.push("amount=?");
        args.push(Box::new(amount.to_string()));
    }
    if let Some(qty) = patch.quantity {
        sets.push("quantity=?");
        args.push(Box::new(qty));
    }
    if let Some(inst) = patch.installments {
        sets.push("installments=?");
        args.push(Box::new(inst));
    }
    if let Some(pm) = &patch.payment_method {
        sets.push("payment_method=?");
        args.push(Box::new(pm.clone()));
    }
    if let Some(status) = patch.status {
        sets.push("status=?");
        args.push(Box::new(status));
    }
    if let Some(date) = patch.transaction_date {
        sets.push("transaction_date=?");
        args.push(Box::new(format_ts(&date)));
    }
    if let Some(rec) = patch.is_recurring {
        sets.push("is_recurring=?");
        args.push(Box::new(rec));
    }

    let updated_at = now_utc().max(existing.updated_at);
    sets.push("updated_at=?");
    args.push(Box::new(format_ts(&updated_at)));
    args.push(Box::new(existing.id));

    let sql = format!("UPDATE expenses SET {} WHERE id=?", sets.join(", "));
    let refs: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();
    conn.execute(&sql, refs.as_slice())?;
    get(conn, existing.id, None)
}

pub fn delete(conn: &Connection, id: i64, user_id: Option<i64>) -> ExpenseResult<()> {
    let existing = get(conn, id, user_id)?;
    conn.execute("DELETE FROM expenses WHERE id=?1", params![existing.id])?;
    Ok(())
}

/// Exact per-category totals. Categories without rows are absent.
pub fn sum_by_category(
    conn: &Connection,
    user_id: i64,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> ExpenseResult<BTreeMap<Category, Decimal>> {
    let mut sql = String::from("SELECT category, amount FROM expenses WHERE user_id=?");
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];
    push_date_range(&mut sql, &mut args, date_from, date_to);

    let mut stmt = conn.prepare(&sql)?;
    let refs: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();
    let rows = stmt.query_map(refs.as_slice(), |r| {
        Ok((r.get::<_, Category>(0)?, decimal_col(r, 1)?))
    })?;

    let mut totals: BTreeMap<Category, Decimal> = BTreeMap::new();
    for row in rows {
        let (cat, amount) = row?;
        *totals.entry(cat).or_insert(Decimal::ZERO) += amount;
    }
    Ok(totals)
}

fn push_date_range(
    sql: &mut String,
    args: &mut Vec<Box<dyn ToSql>>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) {
    if let Some(from) = date_from {
        sql.push_str(" AND transaction_date >= ?");
        args.push(Box::new(format_ts(&day_start(from))));
    }
    if let Some(to) = date_to {
        sql.push_str(" AND transaction_date <= ?");
        args.push(Box::new(format_ts(&day_end(to))));
    }
}

fn row_to_expense(r: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: r.get(0)?,
        user_id: r.get(1)?,
        category: r.get(2)?,
        description: r.get(3)?,
        amount: decimal_col(r, 4)?,
        quantity: r.get(5)?,
        installments: r.get(6)?,
        payment_method: r.get(7)?,
        status: r.get(8)?,
        transaction_date: ts_col(r, 9)?,
        is_recurring: r.get(10)?,
        created_at: ts_col(r, 11)?,
        updated_at: ts_col(r, 12)?,
    })
}

fn decimal_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn ts_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let s: String = r.get(idx)?;
    parse_ts(&s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp '{}'", s).into(),
        )
    })
}
