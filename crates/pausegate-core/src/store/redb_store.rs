use std::path::Path;

use chrono::{DateTime, Utc};
use pausegate_storage::{InsertOutcome, PendingApprovalStorage, Storage};

use super::{PendingStore, sort_by_created};
use crate::error::{Error, Result};
use crate::models::{ActionId, PendingApproval, ResumeToken};

/// Persistent store backed by redb.
///
/// Approvals are JSON-encoded. Every check-and-insert and check-and-remove
/// runs inside a single redb write transaction, so concurrent callers in one
/// process resolve each token at most once, and so do processes that open the
/// database one after another. redb locks the file exclusively, so a second
/// process cannot open it while this store holds it.
#[derive(Debug, Clone)]
pub struct RedbPendingStore {
    storage: PendingApprovalStorage,
}

impl RedbPendingStore {
    pub fn new(storage: PendingApprovalStorage) -> Self {
        Self { storage }
    }

    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let storage = Storage::new(path)?;
        Ok(Self::new(storage.approvals))
    }

    fn decode(bytes: &[u8]) -> Result<PendingApproval> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn decode_all(entries: Vec<(String, Vec<u8>)>) -> Result<Vec<PendingApproval>> {
        let mut approvals = entries
            .into_iter()
            .map(|(_, bytes)| serde_json::from_slice(&bytes).map_err(Error::from))
            .collect::<Result<Vec<PendingApproval>>>()?;
        sort_by_created(&mut approvals);
        Ok(approvals)
    }
}

impl PendingStore for RedbPendingStore {
    fn insert(&self, approval: PendingApproval) -> Result<()> {
        let bytes = serde_json::to_vec(&approval)?;
        let token = approval.resume_token.as_str();
        match self
            .storage
            .insert_new(token, approval.action_id().as_str(), &bytes)?
        {
            InsertOutcome::Inserted => Ok(()),
            InsertOutcome::TokenExists => Err(Error::DuplicateToken(approval.resume_token)),
            InsertOutcome::ActionPending(_) => {
                Err(Error::DuplicateAction(approval.action_id().clone()))
            }
        }
    }

    fn get(&self, token: &ResumeToken) -> Result<Option<PendingApproval>> {
        self.storage
            .get_raw(token.as_str())?
            .map(|bytes| Self::decode(&bytes))
            .transpose()
    }

    fn find_by_action(&self, action_id: &ActionId) -> Result<Option<PendingApproval>> {
        self.storage
            .get_by_action_raw(action_id.as_str())?
            .map(|(_, bytes)| Self::decode(&bytes))
            .transpose()
    }

    /// A record that fails to decode is left in place and the decode error
    /// is returned.
    fn take(&self, token: &ResumeToken) -> Result<Option<PendingApproval>> {
        self.storage
            .take_if(token.as_str(), |bytes| Ok(serde_json::from_slice(bytes)?))
            .map_err(|err| match err.downcast::<serde_json::Error>() {
                Ok(err) => Error::Serialization(err),
                Err(err) => Error::from(err),
            })
    }

    fn take_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<PendingApproval>> {
        let removed = self.storage.take_matching(|bytes| {
            let approval: PendingApproval = serde_json::from_slice(bytes)?;
            Ok(approval.created_at <= cutoff)
        })?;
        Self::decode_all(removed)
    }

    fn list(&self) -> Result<Vec<PendingApproval>> {
        Self::decode_all(self.storage.list_raw()?)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.storage.count()?)
    }

    fn archive(&self, approval: &PendingApproval) -> Result<()> {
        let bytes = serde_json::to_vec(approval)?;
        self.storage.archive(approval.resume_token.as_str(), &bytes)?;
        Ok(())
    }

    fn list_archived(&self) -> Result<Vec<PendingApproval>> {
        Self::decode_all(self.storage.list_archive_raw()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionRequest, ApprovalPrompt};
    use chrono::TimeDelta;
    use serde_json::json;
    use tempfile::TempDir;

    fn approval(token: &str, created_at: DateTime<Utc>) -> PendingApproval {
        approval_for(token, &format!("order-{token}"), created_at)
    }

    fn approval_for(token: &str, action_id: &str, created_at: DateTime<Utc>) -> PendingApproval {
        let request = ActionRequest::from_json(
            action_id,
            json!({ "containers": 12, "destination": "Lagos" }),
        )
        .unwrap();
        let prompt = ApprovalPrompt::for_request(&request);
        PendingApproval::new(ResumeToken::new(token), request, prompt, created_at)
    }

    fn open_store(dir: &TempDir) -> RedbPendingStore {
        RedbPendingStore::open(dir.path().join("approvals.db")).unwrap()
    }

    #[test]
    fn test_round_trip_and_duplicate() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let original = approval("rt_1", Utc::now());
        store.insert(original.clone()).unwrap();

        let fetched = store.get(&ResumeToken::new("rt_1")).unwrap().unwrap();
        assert_eq!(fetched, original);

        let err = store.insert(original).unwrap_err();
        assert!(matches!(err, Error::DuplicateToken(_)));
    }

    #[test]
    fn test_second_approval_for_action_is_rejected_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir);
            let now = Utc::now();
            store.insert(approval_for("rt_1", "order-9", now)).unwrap();
        }

        let reopened = open_store(&dir);
        let now = Utc::now();
        let err = reopened
            .insert(approval_for("rt_2", "order-9", now))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAction(ref id) if id.as_str() == "order-9"));
        assert_eq!(reopened.len().unwrap(), 1);

        let found = reopened
            .find_by_action(&ActionId::new("order-9"))
            .unwrap()
            .unwrap();
        assert_eq!(found.resume_token.as_str(), "rt_1");

        reopened.take(&ResumeToken::new("rt_1")).unwrap();
        reopened
            .insert(approval_for("rt_3", "order-9", now))
            .unwrap();
    }

    #[test]
    fn test_undecodable_record_survives_failed_take() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("approvals.db")).unwrap();
        storage
            .approvals
            .insert_new(
                "rt_old",
                "order-legacy",
                br#"{"resume_token":"rt_old","legacy":true}"#,
            )
            .unwrap();
        let store = RedbPendingStore::new(storage.approvals);

        let token = ResumeToken::new("rt_old");
        let err = store.take(&token).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert_eq!(store.len().unwrap(), 1);

        let err = store.take(&token).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_take_survives_reopen_and_is_exactly_once() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir);
            store.insert(approval("rt_1", Utc::now())).unwrap();
        }

        let reopened = open_store(&dir);
        let token = ResumeToken::new("rt_1");
        assert!(reopened.take(&token).unwrap().is_some());
        assert!(reopened.take(&token).unwrap().is_none());
    }

    #[test]
    fn test_take_stale_and_archive() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let base = Utc::now();
        store.insert(approval("rt_old", base)).unwrap();
        store
            .insert(approval("rt_new", base + TimeDelta::seconds(30)))
            .unwrap();

        let mut stale = store.take_stale(base).unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(store.len().unwrap(), 1);

        let mut expired = stale.remove(0);
        expired.expire(base);
        store.archive(&expired).unwrap();

        let archived = store.list_archived().unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].resume_token.as_str(), "rt_old");
        assert!(store.get(&expired.resume_token).unwrap().is_none());
    }
}
