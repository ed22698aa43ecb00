// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime settings.
//!
//! Resolution order for the database path:
//! 1. `--db` flag (clap also reads `SPENDBOOK_DB` into it)
//! 2. the platform data dir, e.g. `~/.local/share/spendbook/spendbook.sqlite`

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Spendbook", "spendbook"));

pub const ENV_STARTUP_ATTEMPTS: &str = "SPENDBOOK_STARTUP_ATTEMPTS";
pub const ENV_STARTUP_BACKOFF_MS: &str = "SPENDBOOK_STARTUP_BACKOFF_MS";

const DEFAULT_STARTUP_ATTEMPTS: u32 = 5;
const DEFAULT_STARTUP_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub startup_attempts: u32,
    pub startup_backoff: Duration,
}

impl Settings {
    pub fn resolve(db_override: Option<&str>) -> Result<Self> {
        Self::from_lookup(db_override, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::resolve`] but reads variables through `lookup`.
    pub fn from_lookup<F>(db_override: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match db_override.map(str::trim).filter(|s| !s.is_empty()) {
            Some(p) => PathBuf::from(p),
            None => default_db_path()?,
        };
        let startup_attempts = match lookup(ENV_STARTUP_ATTEMPTS) {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid {} '{}'", ENV_STARTUP_ATTEMPTS, v))?,
            None => DEFAULT_STARTUP_ATTEMPTS,
        };
        let startup_backoff = match lookup(ENV_STARTUP_BACKOFF_MS) {
            Some(v) => Duration::from_millis(
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("Invalid {} '{}'", ENV_STARTUP_BACKOFF_MS, v))?,
            ),
            None => DEFAULT_STARTUP_BACKOFF,
        };
        Ok(Self {
            db_path,
            startup_attempts,
            startup_backoff,
        })
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().join("spendbook.sqlite"))
}
