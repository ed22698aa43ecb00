// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn user_arg(required: bool) -> Arg {
    Arg::new("user")
        .long("user")
        .help("Owning user id")
        .value_parser(value_parser!(i64))
        .required(required)
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .help("Expense id")
        .value_parser(value_parser!(i64))
        .required(true)
}

fn range_args() -> [Arg; 2] {
    [
        Arg::new("from").long("from").help("First day, YYYY-MM-DD (inclusive)"),
        Arg::new("to").long("to").help("Last day, YYYY-MM-DD (inclusive)"),
    ]
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print as pretty JSON")
}

fn jsonl_arg() -> Arg {
    Arg::new("jsonl")
        .long("jsonl")
        .action(ArgAction::SetTrue)
        .conflicts_with("json")
        .help("Print one JSON object per line")
}

fn field_args() -> Vec<Arg> {
    vec![
        Arg::new("amount").long("amount").help("Total amount"),
        Arg::new("quantity").long("quantity").help("Number of units"),
        Arg::new("category")
            .long("category")
            .help("Canonical category (e.g. food, HOUSING)"),
        Arg::new("label")
            .long("label")
            .conflicts_with("category")
            .help("Free-text category label (e.g. 'Servicios básicos')"),
        Arg::new("description").long("description"),
        Arg::new("installments").long("installments"),
        Arg::new("payment_method").long("payment-method"),
        Arg::new("status").long("status").help("planned | posted"),
        Arg::new("date")
            .long("date")
            .help("Transaction date (YYYY-MM-DD or RFC 3339)"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("spendbook")
        .version(clap::crate_version!())
        .about("Per-user expense tracking")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("SPENDBOOK_DB")
                .help("Path to the SQLite database"),
        )
        .subcommand(Command::new("init").about("Create the database schema"))
        .subcommand(
            Command::new("expense")
                .about("Create, inspect, and change expenses")
                .subcommand(
                    Command::new("add")
                        .about("Record one expense")
                        .arg(user_arg(true))
                        .args(field_args())
                        .arg(
                            Arg::new("unit_amount")
                                .long("unit-amount")
                                .help("Per-unit price; total = unit amount x quantity"),
                        )
                        .arg(
                            Arg::new("recurring")
                                .long("recurring")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(json_arg()),
                )
                .subcommand(
                    Command::new("batch")
                        .about("Record several line items atomically from a JSON file")
                        .arg(Arg::new("file").long("file").required(true))
                        .arg(json_arg()),
                )
                .subcommand(
                    Command::new("list")
                        .about("List expenses, newest first")
                        .arg(user_arg(true))
                        .arg(Arg::new("category").long("category"))
                        .args(range_args())
                        .arg(json_arg())
                        .arg(jsonl_arg()),
                )
                .subcommand(
                    Command::new("show")
                        .about("Show one expense")
                        .arg(id_arg())
                        .arg(user_arg(false))
                        .arg(json_arg()),
                )
                .subcommand(
                    Command::new("update")
                        .about("Change the given fields of one expense")
                        .arg(id_arg())
                        .arg(user_arg(false))
                        .args(field_args())
                        .arg(
                            Arg::new("recurring")
                                .long("recurring")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("clear_description")
                                .long("clear-description")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("description"),
                        )
                        .arg(
                            Arg::new("clear_installments")
                                .long("clear-installments")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("installments"),
                        )
                        .arg(
                            Arg::new("clear_payment_method")
                                .long("clear-payment-method")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("payment_method"),
                        )
                        .arg(json_arg()),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete one expense")
                        .arg(id_arg())
                        .arg(user_arg(false)),
                )
                .subcommand(
                    Command::new("summary")
                        .about("Totals per category")
                        .arg(user_arg(true))
                        .args(range_args())
                        .arg(json_arg())
                        .arg(jsonl_arg()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("expenses")
                        .arg(user_arg(true))
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv | json"),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .args(range_args()),
                ),
        )
}
