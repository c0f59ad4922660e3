//! CLI setup module
//!
//! Resolves configuration and opens the approval store for CLI usage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use pausegate_core::{ApprovalEngine, ApprovalService, PausegateConfig, RedbPendingStore};
use pausegate_storage::paths;
use tracing::debug;

/// Load configuration from `--config` or the default location.
pub fn load_config(path: Option<&Path>) -> Result<PausegateConfig> {
    match path {
        Some(path) => PausegateConfig::load_from_path(path),
        None => PausegateConfig::load(),
    }
}

/// Pick the database path: `--db-path`, then `[storage] db_path`, then the
/// data directory.
pub fn resolve_db_path(cli_path: Option<PathBuf>, config: &PausegateConfig) -> Result<PathBuf> {
    if let Some(path) = cli_path.or_else(|| config.storage.db_path.clone()) {
        return Ok(path);
    }
    paths::default_database_path()
}

/// Build the approval service over the persistent store
pub fn prepare_service(db_path: &Path) -> Result<ApprovalService> {
    debug!(path = %db_path.display(), "Opening approval store");
    let store = RedbPendingStore::open(db_path)?;
    let engine = ApprovalEngine::new(Arc::new(store));
    Ok(ApprovalService::new(Arc::new(engine)))
}
