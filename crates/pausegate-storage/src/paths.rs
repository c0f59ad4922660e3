//! Path utilities for the pausegate data directory.

use anyhow::Result;
use std::path::PathBuf;

const PAUSEGATE_DIR: &str = "pausegate";
const DATABASE_FILE: &str = "pausegate.db";

/// Environment variable to override the data directory.
const PAUSEGATE_DIR_ENV: &str = "PAUSEGATE_DIR";

/// Resolve the data directory.
/// Priority: PAUSEGATE_DIR env var > <data dir>/pausegate
pub fn resolve_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(PAUSEGATE_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|d| d.join(PAUSEGATE_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))
}

/// Ensure the data directory exists and return its path.
pub fn ensure_data_dir() -> Result<PathBuf> {
    let dir = resolve_data_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default database path: <data dir>/pausegate/pausegate.db
pub fn default_database_path() -> Result<PathBuf> {
    Ok(ensure_data_dir()?.join(DATABASE_FILE))
}
