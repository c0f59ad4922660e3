//! Pending approval storage - byte-level API for suspended actions and their
//! resolved archive.
//!
//! Every mutating operation runs in a single redb write transaction. redb
//! serializes write transactions, so a check-and-remove here is atomic with
//! respect to every other writer of the same database.
//!
//! Besides the token-keyed records, two index tables map each pending action
//! to its token and back. They are updated in the same transaction as the
//! records, so at most one pending approval exists per action.

use anyhow::Result;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, Table, TableDefinition,
};
use std::sync::Arc;

/// Pending table: resume token -> encoded pending approval
const PENDING_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("pending_approvals");
/// Action index: action id -> resume token of its pending approval
const ACTION_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("pending_action_index");
/// Reverse index: resume token -> action id
const TOKEN_ACTION_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("pending_token_actions");
/// Archive table: resume token -> encoded resolved approval
const ARCHIVE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("approval_archive");

/// Result of [`PendingApprovalStorage::insert_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The resume token is already in use; nothing was written.
    TokenExists,
    /// The action already has a pending approval under this token; nothing
    /// was written.
    ActionPending(String),
}

type PendingTables<'txn> = (
    Table<'txn, &'static str, &'static [u8]>,
    Table<'txn, &'static str, &'static str>,
    Table<'txn, &'static str, &'static str>,
);

/// Low-level pending approval storage
#[derive(Debug, Clone)]
pub struct PendingApprovalStorage {
    db: Arc<Database>,
}

impl PendingApprovalStorage {
    /// Create a new PendingApprovalStorage, initializing all tables.
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PENDING_TABLE)?;
        write_txn.open_table(ACTION_INDEX_TABLE)?;
        write_txn.open_table(TOKEN_ACTION_TABLE)?;
        write_txn.open_table(ARCHIVE_TABLE)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    // ============== Pending Operations ==============

    /// Insert a pending approval for `action_id` unless the token is in use
    /// or the action already has a pending approval.
    pub fn insert_new(&self, token: &str, action_id: &str, data: &[u8]) -> Result<InsertOutcome> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut pending = write_txn.open_table(PENDING_TABLE)?;
            let mut actions = write_txn.open_table(ACTION_INDEX_TABLE)?;
            let mut tokens = write_txn.open_table(TOKEN_ACTION_TABLE)?;

            let existing = actions.get(action_id)?.map(|v| v.value().to_string());
            if pending.get(token)?.is_some() {
                InsertOutcome::TokenExists
            } else if let Some(existing) = existing {
                InsertOutcome::ActionPending(existing)
            } else {
                pending.insert(token, data)?;
                actions.insert(action_id, token)?;
                tokens.insert(token, action_id)?;
                InsertOutcome::Inserted
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    /// Get a pending approval by token
    pub fn get_raw(&self, token: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_TABLE)?;
        Ok(table.get(token)?.map(|v| v.value().to_vec()))
    }

    /// Get the pending approval of an action, with its token
    pub fn get_by_action_raw(&self, action_id: &str) -> Result<Option<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let actions = read_txn.open_table(ACTION_INDEX_TABLE)?;
        let Some(token) = actions.get(action_id)?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };
        let pending = read_txn.open_table(PENDING_TABLE)?;
        Ok(pending
            .get(token.as_str())?
            .map(|v| (token.clone(), v.value().to_vec())))
    }

    /// Remove a pending approval and return its data, if it was present
    pub fn take(&self, token: &str) -> Result<Option<Vec<u8>>> {
        self.take_if(token, |bytes| Ok(bytes.to_vec()))
    }

    /// Remove a pending approval after `decode` accepts its data, in one
    /// transaction.
    ///
    /// If `decode` fails the transaction is dropped and the entry stays in
    /// place.
    pub fn take_if<T, F>(&self, token: &str, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        let write_txn = self.db.begin_write()?;
        let decoded = {
            let mut tables = Self::open_pending(&write_txn)?;
            match Self::remove_pending(&mut tables, token)? {
                Some(bytes) => Some(decode(&bytes)?),
                None => None,
            }
        };
        write_txn.commit()?;
        Ok(decoded)
    }

    /// Remove every pending approval accepted by `matches`, in one transaction.
    ///
    /// If `matches` fails for any entry the transaction is dropped and
    /// nothing is removed.
    pub fn take_matching<F>(&self, matches: F) -> Result<Vec<(String, Vec<u8>)>>
    where
        F: Fn(&[u8]) -> Result<bool>,
    {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut tables = Self::open_pending(&write_txn)?;
            let mut keys = Vec::new();
            for entry in tables.0.iter()? {
                let (key, value) = entry?;
                if matches(value.value())? {
                    keys.push(key.value().to_string());
                }
            }

            let mut removed = Vec::with_capacity(keys.len());
            for key in keys {
                if let Some(value) = Self::remove_pending(&mut tables, &key)? {
                    removed.push((key, value));
                }
            }
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// List all pending approvals
    pub fn list_raw(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_TABLE)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            result.push((key.value().to_string(), value.value().to_vec()));
        }
        Ok(result)
    }

    /// Count pending approvals
    pub fn count(&self) -> Result<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_TABLE)?;
        Ok(table.len()? as usize)
    }

    fn open_pending(write_txn: &redb::WriteTransaction) -> Result<PendingTables<'_>> {
        Ok((
            write_txn.open_table(PENDING_TABLE)?,
            write_txn.open_table(ACTION_INDEX_TABLE)?,
            write_txn.open_table(TOKEN_ACTION_TABLE)?,
        ))
    }

    /// Remove a record and its index entries. Records written before the
    /// index existed have no index entries.
    fn remove_pending(tables: &mut PendingTables<'_>, token: &str) -> Result<Option<Vec<u8>>> {
        let (pending, actions, tokens) = tables;
        let Some(data) = pending.remove(token)?.map(|v| v.value().to_vec()) else {
            return Ok(None);
        };
        let action_id = tokens.remove(token)?.map(|v| v.value().to_string());
        if let Some(action_id) = action_id {
            actions.remove(action_id.as_str())?;
        }
        Ok(Some(data))
    }

    /// Insert a record as-is, bypassing the action index.
    #[cfg(test)]
    fn insert_unindexed(&self, token: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        write_txn.open_table(PENDING_TABLE)?.insert(token, data)?;
        write_txn.commit()?;
        Ok(())
    }

    // ============== Archive Operations ==============

    /// Store a resolved approval in the archive
    pub fn archive(&self, token: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ARCHIVE_TABLE)?;
            table.insert(token, data)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// List all archived approvals
    pub fn list_archive_raw(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ARCHIVE_TABLE)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            result.push((key.value().to_string(), value.value().to_vec()));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn create_test_storage() -> PendingApprovalStorage {
        let tmp = NamedTempFile::new().unwrap();
        let db = Arc::new(Database::create(tmp.path()).unwrap());
        PendingApprovalStorage::new(db).unwrap()
    }

    #[test]
    fn test_insert_new_rejects_existing_token() {
        let storage = create_test_storage();
        assert_eq!(
            storage.insert_new("rt_1", "order-1", b"first").unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            storage.insert_new("rt_1", "order-2", b"second").unwrap(),
            InsertOutcome::TokenExists
        );

        let stored = storage.get_raw("rt_1").unwrap().unwrap();
        assert_eq!(stored, b"first");
        assert_eq!(storage.count().unwrap(), 1);
        assert!(storage.get_by_action_raw("order-2").unwrap().is_none());
    }

    #[test]
    fn test_insert_new_rejects_second_approval_for_action() {
        let storage = create_test_storage();
        storage.insert_new("rt_1", "order-1", b"first").unwrap();

        assert_eq!(
            storage.insert_new("rt_2", "order-1", b"second").unwrap(),
            InsertOutcome::ActionPending("rt_1".to_string())
        );
        assert_eq!(storage.count().unwrap(), 1);
        assert_eq!(
            storage.get_by_action_raw("order-1").unwrap(),
            Some(("rt_1".to_string(), b"first".to_vec()))
        );

        // Once resolved, the action may suspend again.
        storage.take("rt_1").unwrap();
        assert!(storage.get_by_action_raw("order-1").unwrap().is_none());
        assert_eq!(
            storage.insert_new("rt_2", "order-1", b"second").unwrap(),
            InsertOutcome::Inserted
        );
    }

    #[test]
    fn test_take_is_exactly_once() {
        let storage = create_test_storage();
        storage.insert_new("rt_1", "order-1", b"data").unwrap();

        assert_eq!(storage.take("rt_1").unwrap(), Some(b"data".to_vec()));
        assert_eq!(storage.take("rt_1").unwrap(), None);
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_take_if_decode_failure_keeps_entry() {
        let storage = create_test_storage();
        storage.insert_new("rt_1", "order-1", b"not json").unwrap();

        let result = storage.take_if("rt_1", |bytes| {
            let value: serde_json::Value = serde_json::from_slice(bytes)?;
            Ok(value)
        });
        assert!(result.is_err());
        assert_eq!(storage.get_raw("rt_1").unwrap(), Some(b"not json".to_vec()));
        assert!(storage.get_by_action_raw("order-1").unwrap().is_some());
    }

    #[test]
    fn test_take_handles_unindexed_records() {
        let storage = create_test_storage();
        storage.insert_unindexed("rt_old", b"legacy").unwrap();

        assert_eq!(storage.take("rt_old").unwrap(), Some(b"legacy".to_vec()));
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_take_matching_removes_only_matches() {
        let storage = create_test_storage();
        for (token, created_at) in [("rt_a", 10), ("rt_b", 20), ("rt_c", 30)] {
            let data = serde_json::to_vec(&json!({ "created_at": created_at })).unwrap();
            storage
                .insert_new(token, &format!("order-{token}"), &data)
                .unwrap();
        }

        let removed = storage
            .take_matching(|bytes| {
                let value: serde_json::Value = serde_json::from_slice(bytes)?;
                Ok(value["created_at"].as_i64().unwrap_or_default() <= 20)
            })
            .unwrap();

        let mut tokens: Vec<_> = removed.into_iter().map(|(token, _)| token).collect();
        tokens.sort();
        assert_eq!(tokens, vec!["rt_a", "rt_b"]);
        assert_eq!(storage.count().unwrap(), 1);
        assert!(storage.get_raw("rt_c").unwrap().is_some());
        assert!(storage.get_by_action_raw("order-rt_a").unwrap().is_none());
        assert!(storage.get_by_action_raw("order-rt_c").unwrap().is_some());
    }

    #[test]
    fn test_take_matching_error_removes_nothing() {
        let storage = create_test_storage();
        storage.insert_new("rt_a", "order-a", b"not json").unwrap();

        let result = storage.take_matching(|bytes| {
            let _: serde_json::Value = serde_json::from_slice(bytes)?;
            Ok(true)
        });
        assert!(result.is_err());
        assert_eq!(storage.count().unwrap(), 1);
    }

    #[test]
    fn test_archive_is_separate_from_pending() {
        let storage = create_test_storage();
        storage.archive("rt_old", b"resolved").unwrap();

        assert_eq!(storage.count().unwrap(), 0);
        assert!(storage.get_raw("rt_old").unwrap().is_none());
        let archived = storage.list_archive_raw().unwrap();
        assert_eq!(archived, vec![("rt_old".to_string(), b"resolved".to_vec())]);
    }
}
