// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use spendbook::commands::expenses;
use spendbook::config::{ENV_STARTUP_ATTEMPTS, ENV_STARTUP_BACKOFF_MS, Settings};
use spendbook::db::{init_schema, open_or_init};
use spendbook::models::{Category, Scalar};
use spendbook::{cli, service};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

fn expense_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["spendbook", "expense"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("expense", m)) => m.clone(),
        _ => panic!("no expense subcommand"),
    }
}

#[test]
fn add_command_builds_loose_payload() {
    let m = expense_matches(&[
        "add",
        "--user",
        "3",
        "--unit-amount",
        " 2.50 ",
        "--quantity",
        "4",
        "--label",
        "Transporte",
        "--recurring",
    ]);
    let Some(("add", add_m)) = m.subcommand() else {
        panic!("no add subcommand");
    };
    let payload = expenses::create_payload(add_m).unwrap();
    assert_eq!(payload.user_id, 3);
    assert_eq!(payload.unit_amount, Some(Scalar::Text("2.50".into())));
    assert_eq!(payload.quantity, Some(Scalar::Text("4".into())));
    assert_eq!(payload.category_label.as_deref(), Some("Transporte"));
    assert_eq!(payload.is_recurring, Some(true));
    assert_eq!(payload.amount, None);
}

#[test]
fn add_then_rm_through_handlers() {
    let mut conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();

    let m = expense_matches(&["add", "--user", "1", "--amount", "19.90", "--category", "food"]);
    expenses::handle(&mut conn, &m).unwrap();
    let id: i64 = conn
        .query_row("SELECT id FROM expenses", [], |r| r.get(0))
        .unwrap();
    let stored = service::get_expense(&conn, id, Some(1)).unwrap();
    assert_eq!(stored.category, Category::Food);
    assert_eq!(stored.amount.to_string(), "19.90");

    let id_str = id.to_string();
    let m = expense_matches(&["rm", "--id", &id_str, "--user", "2"]);
    assert!(expenses::handle(&mut conn, &m).is_err());

    let m = expense_matches(&["rm", "--id", &id_str, "--user", "1"]);
    expenses::handle(&mut conn, &m).unwrap();
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM expenses", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn update_command_clears_nullable_fields() {
    let m = expense_matches(&[
        "update",
        "--id",
        "5",
        "--clear-description",
        "--installments",
        "3",
        "--recurring",
        "false",
    ]);
    let Some(("update", upd_m)) = m.subcommand() else {
        panic!("no update subcommand");
    };
    let payload = expenses::update_payload(upd_m);
    assert_eq!(payload.description, Some(None));
    assert_eq!(payload.installments, Some(Some(Scalar::Text("3".into()))));
    assert_eq!(payload.payment_method, None);
    assert_eq!(payload.is_recurring, Some(false));
}

#[test]
fn list_filter_rejects_unknown_category() {
    let m = expense_matches(&["list", "--user", "1", "--category", "pets"]);
    let Some(("list", list_m)) = m.subcommand() else {
        panic!("no list subcommand");
    };
    let err = expenses::filter_from(list_m).unwrap_err();
    assert!(err.to_string().contains("Unknown category"));
}

#[test]
fn batch_command_reads_json_file() {
    let mut conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("batch.json");
    std::fs::write(
        &path,
        r#"{"user_id": 8, "category_label": "Ocio",
            "items": [
                {"name": "Cine", "monto": "6.5", "cantidad": 2},
                {"name": "Pop", "total": 3}
            ]}"#,
    )
    .unwrap();
    let path_str = path.to_string_lossy().to_string();
    let m = expense_matches(&["batch", "--file", &path_str]);
    expenses::handle(&mut conn, &m).unwrap();

    let totals = service::summarize_by_category(&conn, 8, None, None).unwrap();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].category, Category::Entertainment);
    assert_eq!(totals[0].total_amount.to_string(), "16.00");
}

#[test]
fn settings_from_lookup() {
    let s = Settings::from_lookup(Some("/tmp/x.sqlite"), |_| None).unwrap();
    assert_eq!(s.db_path, PathBuf::from("/tmp/x.sqlite"));
    assert_eq!(s.startup_attempts, 5);
    assert_eq!(s.startup_backoff, Duration::from_secs(2));

    let s = Settings::from_lookup(Some("db.sqlite"), |k| match k {
        k if k == ENV_STARTUP_ATTEMPTS => Some("2".into()),
        k if k == ENV_STARTUP_BACKOFF_MS => Some("10".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(s.startup_attempts, 2);
    assert_eq!(s.startup_backoff, Duration::from_millis(10));

    let err = Settings::from_lookup(Some("db.sqlite"), |k| {
        (k == ENV_STARTUP_ATTEMPTS).then(|| "many".to_string())
    })
    .unwrap_err();
    assert!(err.to_string().contains(ENV_STARTUP_ATTEMPTS));
}

#[test]
fn schema_bootstrap_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("spendbook.sqlite");
    let conn = open_or_init(&path).unwrap();
    init_schema(&conn).unwrap();
    drop(conn);
    assert!(open_or_init(&path).is_ok());
}

#[test]
fn open_with_retry_gives_up_after_bounded_attempts() {
    let dir = tempdir().unwrap();
    // A directory cannot be opened as a database file.
    let settings = Settings {
        db_path: dir.path().to_path_buf(),
        startup_attempts: 2,
        startup_backoff: Duration::from_millis(1),
    };
    let err = spendbook::db::open_with_retry(&settings).unwrap_err();
    assert!(err.to_string().contains("after 2 attempts"));
}
