//! # Record Store
//!
//! Persistence boundary for document records. The manager serializes
//! writes per record, so implementations only need whole-record
//! get/put semantics.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use vidhi_core::DocumentId;

use crate::record::DocumentRecord;

/// Failure of the backing store.
#[derive(Error, Debug)]
#[error("{operation} failed: {message}")]
pub struct StoreError {
    pub operation: &'static str,
    pub message: String,
}

impl StoreError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Where document records live.
pub trait RecordStore: Send + Sync {
    fn get(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError>;

    /// Insert or replace the record with `record.id`.
    fn put(&self, record: DocumentRecord) -> Result<(), StoreError>;

    /// Records whose `parent_id` is `parent`.
    fn list_by_parent(&self, parent: &DocumentId) -> Result<Vec<DocumentRecord>, StoreError>;

    /// All records, ordered by id.
    fn list(&self) -> Result<Vec<DocumentRecord>, StoreError>;
}

/// Thread-safe, cloneable in-memory store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    data: Arc<RwLock<BTreeMap<DocumentId, DocumentRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(self.data.read().get(id).cloned())
    }

    fn put(&self, record: DocumentRecord) -> Result<(), StoreError> {
        self.data.write().insert(record.id.clone(), record);
        Ok(())
    }

    fn list_by_parent(&self, parent: &DocumentId) -> Result<Vec<DocumentRecord>, StoreError> {
        Ok(self
            .data
            .read()
            .values()
            .filter(|r| r.parent_id.as_ref() == Some(parent))
            .cloned()
            .collect())
    }

    fn list(&self) -> Result<Vec<DocumentRecord>, StoreError> {
        Ok(self.data.read().values().cloned().collect())
    }
}
