// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use spendbook::{cli, commands, config::Settings, db};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("SPENDBOOK_LOG", "info"))
        .format_timestamp_secs()
        .format_target(false)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let settings = Settings::resolve(matches.get_one::<String>("db").map(|s| s.as_str()))?;
    let mut conn = db::open_with_retry(&settings)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", settings.db_path.display());
        }
        Some(("expense", sub)) => commands::expenses::handle(&mut conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
