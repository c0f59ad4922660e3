//! Pausegate Storage - embedded persistence for the approval workflow
//!
//! This crate keeps suspended approvals in a redb database so that a decision
//! can arrive in a later process than the one that suspended the action. It
//! exposes byte-level APIs; encoding of the approval records is owned by
//! `pausegate-core`.
//!
//! # Tables
//!
//! - `pending_approvals` - resume token -> encoded pending approval
//! - `pending_action_index` - action id -> resume token
//! - `pending_token_actions` - resume token -> action id
//! - `approval_archive` - resume token -> encoded resolved/expired approval

pub mod paths;
pub mod pending_approval;

use anyhow::Result;
use redb::Database;
use std::path::Path;
use std::sync::Arc;

pub use pending_approval::{InsertOutcome, PendingApprovalStorage};

/// Central storage manager that opens the database and its tables
pub struct Storage {
    pub approvals: PendingApprovalStorage,
}

impl Storage {
    /// Open (or create) the database at the given path.
    ///
    /// Parent directories are created when missing.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Arc::new(Database::create(path)?);
        let approvals = PendingApprovalStorage::new(db)?;
        tracing::debug!(path = %path.display(), "Opened approval database");

        Ok(Self { approvals })
    }
}
