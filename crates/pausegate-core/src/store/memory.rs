use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::{PendingStore, sort_by_created};
use crate::error::{Error, Result};
use crate::models::{ActionId, PendingApproval, ResumeToken};

/// Process-local store. Resolved approvals are not archived.
#[derive(Debug, Default)]
pub struct InMemoryPendingStore {
    inner: Mutex<Inner>,
}

/// Approvals by token plus the action index. Both maps change under one lock.
#[derive(Debug, Default)]
struct Inner {
    pending: HashMap<ResumeToken, PendingApproval>,
    actions: HashMap<ActionId, ResumeToken>,
}

impl Inner {
    fn remove(&mut self, token: &ResumeToken) -> Option<PendingApproval> {
        let approval = self.pending.remove(token)?;
        self.actions.remove(approval.action_id());
        Some(approval)
    }
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PendingStore for InMemoryPendingStore {
    fn insert(&self, approval: PendingApproval) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.pending.contains_key(&approval.resume_token) {
            return Err(Error::DuplicateToken(approval.resume_token));
        }
        if inner.actions.contains_key(approval.action_id()) {
            return Err(Error::DuplicateAction(approval.action_id().clone()));
        }
        inner
            .actions
            .insert(approval.action_id().clone(), approval.resume_token.clone());
        inner.pending.insert(approval.resume_token.clone(), approval);
        Ok(())
    }

    fn get(&self, token: &ResumeToken) -> Result<Option<PendingApproval>> {
        Ok(self.inner.lock().pending.get(token).cloned())
    }

    fn find_by_action(&self, action_id: &ActionId) -> Result<Option<PendingApproval>> {
        let inner = self.inner.lock();
        Ok(inner
            .actions
            .get(action_id)
            .and_then(|token| inner.pending.get(token))
            .cloned())
    }

    fn take(&self, token: &ResumeToken) -> Result<Option<PendingApproval>> {
        Ok(self.inner.lock().remove(token))
    }

    fn take_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<PendingApproval>> {
        let mut inner = self.inner.lock();
        let stale: Vec<ResumeToken> = inner
            .pending
            .values()
            .filter(|approval| approval.created_at <= cutoff)
            .map(|approval| approval.resume_token.clone())
            .collect();

        let mut removed: Vec<PendingApproval> = stale
            .iter()
            .filter_map(|token| inner.remove(token))
            .collect();
        drop(inner);

        sort_by_created(&mut removed);
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<PendingApproval>> {
        let mut approvals: Vec<PendingApproval> =
            self.inner.lock().pending.values().cloned().collect();
        sort_by_created(&mut approvals);
        Ok(approvals)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.inner.lock().pending.len())
    }
}
