//! Session-scoped audit trail of confirmed transactions.
//!
//! A [`HistoryStore`] is created once per test run or tool invocation and
//! passed to every wrapper that records. It tracks one current
//! [`HistoryRecord`]; earlier records stay available for inspection.

use crate::receipt::Receipt;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ledgerkit_config::HistorySettings;
use ledgerkit_core::TxHash;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("No history record has been initialized")]
    NoActiveRecord,

    #[error("Unknown history record {0}")]
    UnknownRecord(usize),

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write history to {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// One confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub deployer_type: String,
    pub name_or_label: String,
    pub transaction_hash: TxHash,
    /// `0` on success, non-zero when execution failed.
    pub status: u8,
    pub gas_used: u64,
    pub block_number: u64,
    pub recorded_at: DateTime<Utc>,
}

impl Action {
    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: usize,
    pub started_at: DateTime<Utc>,
    /// In confirmation-completion order.
    pub actions: Vec<Action>,
}

#[derive(Debug, Default)]
struct Records {
    all: Vec<HistoryRecord>,
    current: Option<usize>,
}

#[derive(Debug, Default)]
pub struct HistoryStore {
    records: Mutex<Records>,
    /// Confirmed outcome per transaction, across every wrapper recording here.
    confirmations: DashMap<TxHash, Arc<OnceCell<Receipt>>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new record and makes it current. Returns its id.
    pub fn init_history_record(&self) -> usize {
        let mut records = self.records.lock();
        let id = records.all.len();
        records.all.push(HistoryRecord {
            id,
            started_at: Utc::now(),
            actions: Vec::new(),
        });
        records.current = Some(id);
        debug!(record = id, "history record started");
        id
    }

    /// The slot a transaction's confirmed receipt is stored in. Every
    /// watcher sharing this store waits on the same slot, so a transaction
    /// is recorded at most once.
    pub(crate) fn confirmation_slot(&self, hash: TxHash) -> Arc<OnceCell<Receipt>> {
        Arc::clone(
            self.confirmations
                .entry(hash)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        )
    }

    /// Snapshot of the current record.
    pub fn current_record(&self) -> HistoryResult<HistoryRecord> {
        let records = self.records.lock();
        let id = records.current.ok_or(HistoryError::NoActiveRecord)?;
        Ok(records.all[id].clone())
    }

    /// Appends to the current record.
    pub fn append(&self, action: Action) -> HistoryResult<()> {
        let mut records = self.records.lock();
        let id = records.current.ok_or(HistoryError::NoActiveRecord)?;
        info!(
            record = id,
            label = %action.name_or_label,
            hash = %action.transaction_hash,
            status = action.status,
            "action recorded"
        );
        records.all[id].actions.push(action);
        Ok(())
    }

    pub fn last_action(&self) -> HistoryResult<Option<Action>> {
        let records = self.records.lock();
        let id = records.current.ok_or(HistoryError::NoActiveRecord)?;
        Ok(records.all[id].actions.last().cloned())
    }

    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records.lock().all.clone()
    }

    pub fn record(&self, id: usize) -> HistoryResult<HistoryRecord> {
        self.records
            .lock()
            .all
            .get(id)
            .cloned()
            .ok_or(HistoryError::UnknownRecord(id))
    }

    /// All retained records as pretty-printed JSON.
    pub fn to_json(&self) -> HistoryResult<String> {
        let records = self.records();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> HistoryResult<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| HistoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "history written");
        Ok(())
    }

    /// Writes to `settings.output_path` when one is configured.
    pub fn export(&self, settings: &HistorySettings) -> HistoryResult<Option<PathBuf>> {
        match &settings.output_path {
            Some(path) => {
                self.write_json(path)?;
                Ok(Some(path.clone()))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(label: &str) -> Action {
        Action {
            deployer_type: "ContractWrapper".to_string(),
            name_or_label: label.to_string(),
            transaction_hash: TxHash::keccak(label.as_bytes()),
            status: 0,
            gas_used: 21_000,
            block_number: 1,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn append_requires_an_active_record() {
        let store = HistoryStore::new();
        assert!(matches!(
            store.append(action("early")),
            Err(HistoryError::NoActiveRecord)
        ));
        assert!(matches!(
            store.current_record(),
            Err(HistoryError::NoActiveRecord)
        ));
    }

    #[test]
    fn new_record_becomes_current_and_old_ones_are_kept() {
        let store = HistoryStore::new();
        let first = store.init_history_record();
        store.append(action("one")).unwrap();
        let second = store.init_history_record();
        store.append(action("two")).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.current_record().unwrap().id, second);
        assert_eq!(store.record(first).unwrap().actions[0].name_or_label, "one");
        assert_eq!(store.last_action().unwrap().unwrap().name_or_label, "two");
        assert_eq!(store.records().len(), 2);
        assert!(matches!(store.record(9), Err(HistoryError::UnknownRecord(9))));
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let store = HistoryStore::new();
        store.init_history_record();
        store.append(action("Transfer Ownership")).unwrap();

        let value: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        let entry = &value[0]["actions"][0];
        assert_eq!(entry["nameOrLabel"], "Transfer Ownership");
        assert_eq!(entry["deployerType"], "ContractWrapper");
        assert_eq!(entry["status"], 0);
        assert!(entry["transactionHash"].as_str().unwrap().starts_with("0x"));
    }

    #[test]
    fn export_without_path_writes_nothing() {
        let store = HistoryStore::new();
        let settings = HistorySettings {
            output_path: None,
            ..HistorySettings::default()
        };
        assert!(store.export(&settings).unwrap().is_none());
    }
}
