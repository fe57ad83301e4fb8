//! Path resolution for persondb-provider
//!
//! # Environment Variables
//!
//! - `CUSTOM_DATABASE_FILENAME` - Database file used when neither `--database`
//!   nor `provider.database_filename` is set
//!
//! # Database Resolution Priority
//!
//! 1. `--database` flag
//! 2. `database_filename` in the `[provider]` table
//! 3. `CUSTOM_DATABASE_FILENAME` environment variable
//!
//! The first source that is set wins, even when it is empty; an empty value
//! is an error rather than a reason to fall through.

use anyhow::{Result, bail};
use std::path::PathBuf;

/// Environment variable naming the database file
pub const ENV_DATABASE: &str = "CUSTOM_DATABASE_FILENAME";

/// Default desired-config file
pub const DEFAULT_CONFIG_FILE: &str = "persondb.toml";

/// Default state file
pub const DEFAULT_STATE_FILE: &str = "persondb.state.json";

/// Expand a leading `~` in a path
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}

/// Pick the database file from flag, provider setting and environment
pub fn resolve_database(
    flag: Option<&str>,
    setting: Option<&str>,
    env: Option<&str>,
) -> Result<PathBuf> {
    let (source, value) = if let Some(value) = flag {
        ("--database", value)
    } else if let Some(value) = setting {
        ("provider.database_filename", value)
    } else if let Some(value) = env {
        (ENV_DATABASE, value)
    } else {
        bail!(
            "Missing persons database filename. Set database_filename in the [provider] \
             table, pass --database, or set {ENV_DATABASE}."
        );
    };

    if value.trim().is_empty() {
        bail!("Persons database filename from {source} is empty");
    }

    let path = expand_path(value);
    log::debug!("Using database from {source}: {}", path.display());
    Ok(path)
}
