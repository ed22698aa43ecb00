// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Validation and coercion of inbound expense payloads.
//!
//! Payload fields arrive loosely typed (numbers as text, enum members in any
//! case, free-text category labels). Everything here turns them into the
//! canonical types stored by [`crate::store`], or fails with
//! [`ExpenseError::Validation`] before anything is written.

use crate::error::{ExpenseError, ExpenseResult};
use crate::labels;
use crate::models::{
    Category, ExpenseBatchCreate, ExpenseCreate, ExpenseItem, ExpensePatch, ExpenseStatus,
    ExpenseUpdate, NewExpense, Scalar,
};
use crate::utils::now_utc;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound};
use rust_decimal::{Decimal, RoundingStrategy};

pub const DESCRIPTION_MAX: usize = 255;
pub const PAYMENT_METHOD_MAX: usize = 50;

/// Fields shared by every line item of a batch, resolved once.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedFields {
    pub category: Category,
    pub status: ExpenseStatus,
    pub transaction_date: NaiveDateTime,
    pub is_recurring: bool,
}

pub fn normalize(payload: &ExpenseCreate) -> ExpenseResult<NewExpense> {
    let category =
        resolve_category(payload.category.as_deref(), payload.category_label.as_deref())?;
    let status = match payload.status.as_deref() {
        Some(s) => parse_status(s)?,
        None => ExpenseStatus::default(),
    };
    let quantity = coerce_quantity(payload.quantity.as_ref())?;
    let amount = derive_amount(payload.amount.as_ref(), payload.unit_amount.as_ref(), quantity)?;
    let transaction_date = match payload.transaction_date.as_deref() {
        Some(s) => parse_transaction_date(s)?,
        None => now_utc(),
    };

    Ok(NewExpense {
        user_id: payload.user_id,
        category,
        description: check_text("description", payload.description.as_deref(), DESCRIPTION_MAX)?,
        amount,
        quantity,
        installments: coerce_installments(payload.installments.as_ref())?,
        payment_method: check_text(
            "payment_method",
            payload.payment_method.as_deref(),
            PAYMENT_METHOD_MAX,
        )?,
        status,
        transaction_date,
        is_recurring: payload.is_recurring.unwrap_or(false),
    })
}

pub fn normalize_shared(payload: &ExpenseBatchCreate) -> ExpenseResult<SharedFields> {
    Ok(SharedFields {
        category: resolve_category(payload.category.as_deref(), payload.category_label.as_deref())?,
        status: match payload.status.as_deref() {
            Some(s) => parse_status(s)?,
            None => ExpenseStatus::default(),
        },
        transaction_date: match payload.transaction_date.as_deref() {
            Some(s) => parse_transaction_date(s)?,
            None => now_utc(),
        },
        is_recurring: payload.is_recurring.unwrap_or(false),
    })
}

pub fn normalize_item(
    user_id: i64,
    shared: &SharedFields,
    item: &ExpenseItem,
) -> ExpenseResult<NewExpense> {
    let quantity = coerce_quantity(item.quantity.as_ref())?;
    let amount = derive_amount(item.amount.as_ref(), item.unit_amount.as_ref(), quantity)?;
    Ok(NewExpense {
        user_id,
        category: shared.category,
        description: check_text("description", Some(&item.description), DESCRIPTION_MAX)?,
        amount,
        quantity,
        installments: coerce_installments(item.installments.as_ref())?,
        payment_method: check_text(
            "payment_method",
            item.payment_method.as_deref(),
            PAYMENT_METHOD_MAX,
        )?,
        status: shared.status,
        transaction_date: shared.transaction_date,
        is_recurring: shared.is_recurring,
    })
}

/// Only fields present in the update are validated and carried over.
pub fn normalize_update(update: &ExpenseUpdate) -> ExpenseResult<ExpensePatch> {
    let label = update.category_label.as_deref().filter(|l| !l.is_empty());
    let category = if update.category.is_some() || label.is_some() {
        Some(resolve_category(update.category.as_deref(), label)?)
    } else {
        None
    };

    let description = match &update.description {
        Some(v) => Some(check_text("description", v.as_deref(), DESCRIPTION_MAX)?),
        None => None,
    };
    let payment_method = match &update.payment_method {
        Some(v) => Some(check_text("payment_method", v.as_deref(), PAYMENT_METHOD_MAX)?),
        None => None,
    };
    let installments = match &update.installments {
        Some(v) => Some(coerce_installments(v.as_ref())?),
        None => None,
    };
    let quantity = match &update.quantity {
        Some(q) => Some(coerce_quantity(Some(q))?),
        None => None,
    };
    let amount = match &update.amount {
        Some(a) => Some(coerce_amount("amount", a)?),
        None => None,
    };
    let status = match update.status.as_deref() {
        Some(s) => Some(parse_status(s)?),
        None => None,
    };
    let transaction_date = match update.transaction_date.as_deref() {
        Some(s) => Some(parse_transaction_date(s)?),
        None => None,
    };

    Ok(ExpensePatch {
        category,
        description,
        amount,
        quantity,
        installments,
        payment_method,
        status,
        transaction_date,
        is_recurring: update.is_recurring,
    })
}

/// Explicit category first, then the free-text label, then `other`.
pub fn resolve_category(category: Option<&str>, label: Option<&str>) -> ExpenseResult<Category> {
    if let Some(value) = category {
        return Category::parse(value).ok_or_else(|| ExpenseError::validation("invalid category"));
    }
    match label {
        Some(l) if !l.is_empty() => {
            labels::resolve(l).ok_or_else(|| ExpenseError::validation("unrecognized category"))
        }
        _ => Ok(Category::Other),
    }
}

pub fn parse_status(value: &str) -> ExpenseResult<ExpenseStatus> {
    ExpenseStatus::parse(value).ok_or_else(|| ExpenseError::validation("invalid status"))
}

pub fn coerce_quantity(value: Option<&Scalar>) -> ExpenseResult<i64> {
    let Some(raw) = value else {
        return Ok(1);
    };
    let quantity = scalar_to_int(raw).ok_or_else(|| ExpenseError::validation("invalid quantity"))?;
    if quantity < 1 {
        return Err(ExpenseError::validation("quantity must be positive"));
    }
    Ok(quantity)
}

pub fn coerce_installments(value: Option<&Scalar>) -> ExpenseResult<Option<i64>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let n = scalar_to_int(raw).ok_or_else(|| ExpenseError::validation("invalid installments"))?;
    if n < 1 {
        return Err(ExpenseError::validation("installments must be positive"));
    }
    Ok(Some(n))
}

/// Explicit total wins; otherwise `unit_amount * quantity`.
pub fn derive_amount(
    amount: Option<&Scalar>,
    unit_amount: Option<&Scalar>,
    quantity: i64,
) -> ExpenseResult<Decimal> {
    let amount = amount
        .map(|a| scalar_to_decimal(a).ok_or_else(|| ExpenseError::validation("invalid amount")))
        .transpose()?;
    let unit_amount = unit_amount
        .map(|u| scalar_to_decimal(u).ok_or_else(|| ExpenseError::validation("invalid amount")))
        .transpose()?;

    let total = match (amount, unit_amount) {
        (Some(total), _) => total,
        (None, Some(unit)) => {
            if unit <= Decimal::ZERO {
                return Err(ExpenseError::validation("unit_amount must be positive"));
            }
            unit.checked_mul(Decimal::from(quantity))
                .ok_or_else(|| ExpenseError::validation("invalid amount"))?
        }
        (None, None) => return Err(ExpenseError::validation("amount required")),
    };
    finish_amount(total)
}

pub fn coerce_amount(field: &str, value: &Scalar) -> ExpenseResult<Decimal> {
    let d = scalar_to_decimal(value)
        .ok_or_else(|| ExpenseError::validation(format!("invalid {}", field)))?;
    finish_amount(d)
}

// NUMERIC(12,2)
fn amount_max() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

fn finish_amount(d: Decimal) -> ExpenseResult<Decimal> {
    let mut rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded <= Decimal::ZERO {
        return Err(ExpenseError::validation("amount must be positive"));
    }
    if rounded > amount_max() {
        return Err(ExpenseError::validation("amount too large"));
    }
    rounded.rescale(2);
    Ok(rounded)
}

/// Years outside 1..=9999 are rejected; they would not sort as stored text.
pub fn parse_transaction_date(value: &str) -> ExpenseResult<NaiveDateTime> {
    parse_datetime(value.trim())
        .filter(|dt| (1..=9999).contains(&dt.year()))
        .ok_or_else(|| ExpenseError::validation("invalid transaction_date"))
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().trunc_subsecs(6));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.trunc_subsecs(6));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn check_text(field: &str, value: Option<&str>, max: usize) -> ExpenseResult<Option<String>> {
    match value {
        Some(s) if s.chars().count() > max => Err(ExpenseError::validation(format!(
            "{} too long (max {} characters)",
            field, max
        ))),
        Some(s) => Ok(Some(s.to_string())),
        None => Ok(None),
    }
}

fn scalar_to_decimal(value: &Scalar) -> Option<Decimal> {
    let text = match value {
        Scalar::Number(n) => n.to_string(),
        Scalar::Text(s) => s.trim().to_string(),
    };
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

fn scalar_to_int(value: &Scalar) -> Option<i64> {
    match value {
        Scalar::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Scalar::Text(s) => s.trim().parse::<i64>().ok(),
    }
}
