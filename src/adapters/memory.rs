//! In-memory record store
//!
//! Used for development, dry runs and tests. Contents are lost on exit.

use crate::adapters::database::traits::RecordStore;
use crate::core::assembler::FeedbackRecord;
use crate::domain::{RecordId, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local [`RecordStore`]
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<RecordId, FeedbackRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored record by key
    pub fn get(&self, id: &RecordId) -> Option<FeedbackRecord> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(id).cloned())
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn test_connection(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn store(&self, record: &FeedbackRecord) -> Result<RecordId, StorageError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StorageError::InsertFailed("record map lock poisoned".to_string()))?;

        if records.contains_key(&record.id) {
            return Err(StorageError::Conflict(record.id.to_string()));
        }
        records.insert(record.id.clone(), record.clone());

        tracing::debug!(record_id = %record.id, "Stored record in memory");
        Ok(record.id.clone())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
