// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    Category, Expense, ExpenseBatchCreate, ExpenseCreate, ExpenseFilter, ExpenseUpdate, Scalar,
};
use crate::service;
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::fs;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("batch", sub)) => batch(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn text(sub: &clap::ArgMatches, id: &str) -> Option<String> {
    sub.get_one::<String>(id).map(|s| s.to_string())
}

fn scalar(sub: &clap::ArgMatches, id: &str) -> Option<Scalar> {
    sub.get_one::<String>(id).map(|s| Scalar::Text(s.trim().to_string()))
}

fn user(sub: &clap::ArgMatches) -> Option<i64> {
    sub.get_one::<i64>("user").copied()
}

pub fn create_payload(sub: &clap::ArgMatches) -> Result<ExpenseCreate> {
    Ok(ExpenseCreate {
        user_id: user(sub).context("--user is required")?,
        category: text(sub, "category"),
        category_label: text(sub, "label"),
        description: text(sub, "description"),
        amount: scalar(sub, "amount"),
        unit_amount: scalar(sub, "unit_amount"),
        quantity: scalar(sub, "quantity"),
        installments: scalar(sub, "installments"),
        payment_method: text(sub, "payment_method"),
        status: text(sub, "status"),
        transaction_date: text(sub, "date"),
        is_recurring: Some(sub.get_flag("recurring")),
    })
}

pub fn update_payload(sub: &clap::ArgMatches) -> ExpenseUpdate {
    let clearable = |value: Option<String>, clear: &str| {
        if sub.get_flag(clear) {
            Some(None)
        } else {
            value.map(Some)
        }
    };
    ExpenseUpdate {
        category: text(sub, "category"),
        category_label: text(sub, "label"),
        description: clearable(text(sub, "description"), "clear_description"),
        amount: scalar(sub, "amount"),
        quantity: scalar(sub, "quantity"),
        installments: if sub.get_flag("clear_installments") {
            Some(None)
        } else {
            scalar(sub, "installments").map(Some)
        },
        payment_method: clearable(text(sub, "payment_method"), "clear_payment_method"),
        status: text(sub, "status"),
        transaction_date: text(sub, "date"),
        is_recurring: sub.get_one::<bool>("recurring").copied(),
    }
}

pub fn filter_from(sub: &clap::ArgMatches) -> Result<ExpenseFilter> {
    let category = match sub.try_get_one::<String>("category").ok().flatten() {
        Some(c) => Some(
            Category::parse(c.trim()).ok_or_else(|| anyhow!("Unknown category '{}'", c))?,
        ),
        None => None,
    };
    Ok(ExpenseFilter {
        user_id: user(sub).context("--user is required")?,
        category,
        date_from: sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?,
        date_to: sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?,
    })
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let payload = create_payload(sub)?;
    let expense = service::create_expense(conn, &payload)?;
    if !maybe_print_json(sub.get_flag("json"), false, &expense)? {
        println!(
            "Recorded expense #{}: {} ({}) on {}",
            expense.id,
            fmt_money(&expense.amount),
            expense.category,
            expense.transaction_date.date()
        );
    }
    Ok(())
}

fn batch(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("file").unwrap().trim();
    let raw = fs::read_to_string(path).with_context(|| format!("Read batch file {}", path))?;
    let payload: ExpenseBatchCreate =
        serde_json::from_str(&raw).with_context(|| format!("Parse batch file {}", path))?;
    let result = service::create_expenses_batch(conn, &payload)?;
    if !maybe_print_json(sub.get_flag("json"), false, &result)? {
        println!("{}", expense_table(&result.created));
        println!(
            "Recorded {} expenses, total {}",
            result.created.len(),
            fmt_money(&result.total_amount)
        );
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = filter_from(sub)?;
    let rows = service::list_expenses(conn, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        println!("{}", expense_table(&rows));
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let expense = service::get_expense(conn, id, user(sub))?;
    if !maybe_print_json(sub.get_flag("json"), false, &expense)? {
        println!("{}", expense_table(std::slice::from_ref(&expense)));
    }
    Ok(())
}

fn update(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let payload = update_payload(sub);
    let expense = service::update_expense(conn, id, &payload, user(sub))?;
    if !maybe_print_json(sub.get_flag("json"), false, &expense)? {
        println!("Updated expense #{}", expense.id);
    }
    Ok(())
}

fn rm(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    service::delete_expense(conn, id, user(sub))?;
    println!("Removed expense #{}", id);
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = user(sub).context("--user is required")?;
    let date_from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let date_to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    let totals = service::summarize_by_category(conn, user_id, date_from, date_to)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        let grand: Decimal = totals.iter().map(|t| t.total_amount).sum();
        let mut rows: Vec<Vec<String>> = totals
            .iter()
            .map(|t| vec![t.category.to_string(), fmt_money(&t.total_amount)])
            .collect();
        rows.push(vec!["(total)".into(), fmt_money(&grand)]);
        println!("{}", pretty_table(&["Category", "Total"], rows));
    }
    Ok(())
}

fn expense_table(rows: &[Expense]) -> comfy_table::Table {
    let data = rows
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.transaction_date.format("%Y-%m-%d %H:%M").to_string(),
                e.category.to_string(),
                e.description.clone().unwrap_or_default(),
                e.quantity.to_string(),
                fmt_money(&e.amount),
                e.status.to_string(),
                e.payment_method.clone().unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(
        &["ID", "Date", "Category", "Description", "Qty", "Amount", "Status", "Payment"],
        data,
    )
}
