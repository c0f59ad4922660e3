//! Pending-approval stores.
//!
//! The approval engine keeps no state of its own: the token -> approval map
//! lives behind [`PendingStore`]. Implementations must make [`PendingStore::take`]
//! and [`PendingStore::take_stale`] atomic check-and-remove operations; that is
//! what gives `resolve` its exactly-once guarantee under concurrent callers.
//! [`PendingStore::insert`] is likewise an atomic check-and-insert keyed by
//! both token and action, so an action has at most one pending approval.

mod memory;
mod redb_store;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{ActionId, PendingApproval, ResumeToken};

pub use memory::InMemoryPendingStore;
pub use redb_store::RedbPendingStore;

/// Storage for approvals awaiting a decision, keyed by resume token.
pub trait PendingStore: Send + Sync {
    /// Store a new pending approval.
    ///
    /// Fails with `Error::DuplicateToken` if the token is already present and
    /// with `Error::DuplicateAction` if the action already has a pending
    /// approval. Both checks and the write form one atomic step.
    fn insert(&self, approval: PendingApproval) -> Result<()>;

    /// Look up a pending approval without removing it.
    fn get(&self, token: &ResumeToken) -> Result<Option<PendingApproval>>;

    /// The pending approval of `action_id`, if it has one.
    fn find_by_action(&self, action_id: &ActionId) -> Result<Option<PendingApproval>>;

    /// Atomically remove and return the approval for `token`.
    fn take(&self, token: &ResumeToken) -> Result<Option<PendingApproval>>;

    /// Atomically remove and return every approval created at or before `cutoff`.
    fn take_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<PendingApproval>>;

    /// All pending approvals, oldest first.
    fn list(&self) -> Result<Vec<PendingApproval>>;

    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Record a resolved or expired approval. Archived approvals are never
    /// resumable.
    fn archive(&self, approval: &PendingApproval) -> Result<()> {
        let _ = approval;
        Ok(())
    }

    /// Archived approvals, oldest first.
    fn list_archived(&self) -> Result<Vec<PendingApproval>> {
        Ok(Vec::new())
    }
}

fn sort_by_created(approvals: &mut [PendingApproval]) {
    approvals.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.resume_token.cmp(&b.resume_token))
    });
}
