// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::expenses::filter_from;
use crate::service;
use crate::utils::{fmt_money, format_ts};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => export_expenses(conn, sub),
        _ => Ok(()),
    }
}

fn export_expenses(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let filter = filter_from(sub)?;
    let rows = service::list_expenses(conn, &filter)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "transaction_date",
                "category",
                "description",
                "quantity",
                "amount",
                "installments",
                "payment_method",
                "status",
                "is_recurring",
            ])?;
            for e in &rows {
                wtr.write_record([
                    e.id.to_string(),
                    format_ts(&e.transaction_date),
                    e.category.to_string(),
                    e.description.clone().unwrap_or_default(),
                    e.quantity.to_string(),
                    fmt_money(&e.amount),
                    e.installments.map(|i| i.to_string()).unwrap_or_default(),
                    e.payment_method.clone().unwrap_or_default(),
                    e.status.to_string(),
                    e.is_recurring.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} expenses to {}", rows.len(), out);
    Ok(())
}
