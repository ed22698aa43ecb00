// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use spendbook::db::init_schema;
use spendbook::models::ExpenseCreate;
use spendbook::{cli, commands::exporter, service};
use tempfile::tempdir;

fn base_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    for (amount, label, date) in [
        ("12.34", "Supermercado", "2025-01-02T09:00:00"),
        ("50", "Arriendo", "2025-01-05"),
        ("8", "Farmacia", "2025-02-01"),
    ] {
        let payload = ExpenseCreate {
            user_id: 1,
            amount: Some(amount.into()),
            category_label: Some(label.into()),
            description: Some(format!("{} run", label)),
            transaction_date: Some(date.into()),
            ..Default::default()
        };
        service::create_expense(&mut conn, &payload).unwrap();
    }
    conn
}

fn run_export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["spendbook", "export", "expenses"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("export command not parsed");
    }
}

#[test]
fn export_expenses_writes_pretty_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&conn, &["--user", "1", "--format", "json", "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let arr = parsed.as_array().unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[0]["category"], "health");
    assert_eq!(arr[2]["category"], "food");
    assert_eq!(arr[2]["amount"], "12.34");
    assert!(contents.contains("\n  "));
}

#[test]
fn export_expenses_csv_respects_date_range() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(
        &conn,
        &[
            "--user", "1", "--out", &out_str, "--from", "2025-01-01", "--to", "2025-01-31",
        ],
    )
    .unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[2], "category");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][2], "housing");
    assert_eq!(&rows[0][5], "50.00");
    assert_eq!(&rows[1][3], "Supermercado run");
}

#[test]
fn export_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_str = dir.path().join("x.xml").to_string_lossy().to_string();
    let err =
        run_export(&conn, &["--user", "1", "--format", "xml", "--out", &out_str]).unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
}
