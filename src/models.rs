// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical expense categories. The text value is the lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Housing,
    Utilities,
    Transport,
    Food,
    Health,
    Education,
    Entertainment,
    Personal,
    Subscription,
    Debt,
    Savings,
    Other,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Housing,
        Category::Utilities,
        Category::Transport,
        Category::Food,
        Category::Health,
        Category::Education,
        Category::Entertainment,
        Category::Personal,
        Category::Subscription,
        Category::Debt,
        Category::Savings,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Transport => "transport",
            Category::Food => "food",
            Category::Health => "health",
            Category::Education => "education",
            Category::Entertainment => "entertainment",
            Category::Personal => "personal",
            Category::Subscription => "subscription",
            Category::Debt => "debt",
            Category::Savings => "savings",
            Category::Other => "other",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Housing => "HOUSING",
            Category::Utilities => "UTILITIES",
            Category::Transport => "TRANSPORT",
            Category::Food => "FOOD",
            Category::Health => "HEALTH",
            Category::Education => "EDUCATION",
            Category::Entertainment => "ENTERTAINMENT",
            Category::Personal => "PERSONAL",
            Category::Subscription => "SUBSCRIPTION",
            Category::Debt => "DEBT",
            Category::Savings => "SAVINGS",
            Category::Other => "OTHER",
        }
    }

    /// Accepts the literal value ("food") or, case-insensitively, the member name.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(c) = Self::ALL.iter().copied().find(|c| c.as_str() == s) {
            return Some(c);
        }
        let upper = s.to_uppercase();
        Self::ALL.iter().copied().find(|c| c.name() == upper)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Planned,
    #[default]
    Posted,
}

impl ExpenseStatus {
    pub const ALL: [ExpenseStatus; 2] = [ExpenseStatus::Planned, ExpenseStatus::Posted];

    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseStatus::Planned => "planned",
            ExpenseStatus::Posted => "posted",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExpenseStatus::Planned => "PLANNED",
            ExpenseStatus::Posted => "POSTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if let Some(st) = Self::ALL.iter().copied().find(|st| st.as_str() == s) {
            return Some(st);
        }
        let upper = s.to_uppercase();
        Self::ALL.iter().copied().find(|st| st.name() == upper)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Category::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown category '{}'", s).into()))
    }
}

impl ToSql for ExpenseStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ExpenseStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        ExpenseStatus::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown status '{}'", s).into()))
    }
}

/// A persisted expense row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub category: Category,
    pub description: Option<String>,
    pub amount: Decimal,
    pub quantity: i64,
    pub installments: Option<i64>,
    pub payment_method: Option<String>,
    pub status: ExpenseStatus,
    pub transaction_date: NaiveDateTime,
    pub is_recurring: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Canonical, validated fields for a row that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub user_id: i64,
    pub category: Category,
    pub description: Option<String>,
    pub amount: Decimal,
    pub quantity: i64,
    pub installments: Option<i64>,
    pub payment_method: Option<String>,
    pub status: ExpenseStatus,
    pub transaction_date: NaiveDateTime,
    pub is_recurring: bool,
}

/// Canonical partial update. `None` leaves the column untouched; for the
/// nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub category: Option<Category>,
    pub description: Option<Option<String>>,
    pub amount: Option<Decimal>,
    pub quantity: Option<i64>,
    pub installments: Option<Option<i64>>,
    pub payment_method: Option<Option<String>>,
    pub status: Option<ExpenseStatus>,
    pub transaction_date: Option<NaiveDateTime>,
    pub is_recurring: Option<bool>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        *self == ExpensePatch::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub user_id: i64,
    pub category: Option<Category>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseSummary {
    pub category: Category,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchCreated {
    pub created: Vec<Expense>,
    pub total_amount: Decimal,
}

/// A loosely-typed scalar as it arrives from a caller: a JSON number or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Single-create payload (`POST /expenses`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseCreate {
    pub user_id: i64,
    pub category: Option<String>,
    pub category_label: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Scalar>,
    pub unit_amount: Option<Scalar>,
    pub quantity: Option<Scalar>,
    pub installments: Option<Scalar>,
    pub payment_method: Option<String>,
    pub status: Option<String>,
    pub transaction_date: Option<String>,
    pub is_recurring: Option<bool>,
}

/// Partial-update payload (`PATCH /expenses/{id}`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseUpdate {
    pub category: Option<String>,
    pub category_label: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub amount: Option<Scalar>,
    pub quantity: Option<Scalar>,
    #[serde(default, deserialize_with = "nullable")]
    pub installments: Option<Option<Scalar>>,
    #[serde(default, deserialize_with = "nullable")]
    pub payment_method: Option<Option<String>>,
    pub status: Option<String>,
    pub transaction_date: Option<String>,
    pub is_recurring: Option<bool>,
}

/// One line item of a batch request. Accepts the Spanish field names the
/// web front end sends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseItem {
    #[serde(rename = "name", alias = "description")]
    pub description: String,
    #[serde(alias = "total")]
    pub amount: Option<Scalar>,
    #[serde(alias = "monto")]
    pub unit_amount: Option<Scalar>,
    #[serde(alias = "cantidad")]
    pub quantity: Option<Scalar>,
    #[serde(alias = "cuotas")]
    pub installments: Option<Scalar>,
    pub payment_method: Option<String>,
}

/// Batch-create payload (`POST /expenses/batch`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseBatchCreate {
    pub user_id: i64,
    pub category: Option<String>,
    pub category_label: Option<String>,
    pub status: Option<String>,
    pub transaction_date: Option<String>,
    pub is_recurring: Option<bool>,
    #[serde(default)]
    pub items: Vec<ExpenseItem>,
}

// Distinguishes an absent key (None) from an explicit null (Some(None)).
fn nullable<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}
