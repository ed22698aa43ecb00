// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::thread;

/// Open the database and create the schema, retrying a bounded number of
/// times while the store is not ready. Exhausting the attempts is fatal.
pub fn open_with_retry(settings: &Settings) -> Result<Connection> {
    let attempts = settings.startup_attempts.max(1);
    let mut last_err = None;
    for attempt in 1..=attempts {
        match open_or_init(&settings.db_path) {
            Ok(conn) => {
                info!("database ready at {}", settings.db_path.display());
                return Ok(conn);
            }
            Err(err) => {
                warn!(
                    "database not ready (attempt {}/{}): {:#}",
                    attempt, attempts, err
                );
                last_err = Some(err);
                if attempt < attempts {
                    thread::sleep(settings.startup_backoff);
                }
            }
        }
    }
    let err = last_err.unwrap_or_else(|| anyhow!("no attempt made"));
    Err(err.context(format!(
        "Database unavailable after {} attempts, could not create expenses table",
        attempts
    )))
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Idempotent; safe to run on every start.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        category TEXT NOT NULL DEFAULT 'other',
        description TEXT CHECK(description IS NULL OR length(description) <= 255),
        amount TEXT NOT NULL, -- NUMERIC(12,2) as decimal text
        quantity INTEGER NOT NULL DEFAULT 1 CHECK(quantity >= 1),
        installments INTEGER CHECK(installments IS NULL OR installments > 0),
        payment_method TEXT CHECK(payment_method IS NULL OR length(payment_method) <= 50),
        status TEXT NOT NULL DEFAULT 'posted' CHECK(status IN ('planned','posted')),
        transaction_date TEXT NOT NULL,
        is_recurring INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_user_date ON expenses(user_id, transaction_date);
    "#,
    )?;
    Ok(())
}
