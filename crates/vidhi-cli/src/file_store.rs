//! # JSON File Record Store
//!
//! One pretty-printed JSON file per record, named by document id. Each
//! write goes to its own uniquely named temporary file in the same
//! directory and is then renamed into place, so a reader never sees a
//! half-written record and concurrent writers never share a temp file.

use std::io::Write;
use std::path::{Path, PathBuf};

use vidhi_core::DocumentId;
use vidhi_lifecycle::{DocumentRecord, RecordStore, StoreError};

#[derive(Debug, Clone)]
pub struct JsonFileRecordStore {
    dir: PathBuf,
}

impl JsonFileRecordStore {
    /// A store over `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File of record `id`. Ids that could escape the directory are
    /// rejected.
    fn record_path(&self, id: &DocumentId) -> Result<PathBuf, StoreError> {
        let raw = id.as_str();
        let safe = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'));
        if !safe {
            return Err(StoreError::new("resolve", format!("record id {raw:?} is not a valid file name")));
        }
        Ok(self.dir.join(format!("{}.json", raw.replace(':', "_"))))
    }

    fn read(path: &Path) -> Result<DocumentRecord, StoreError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::new("read", format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text).map_err(|e| StoreError::new("decode", format!("{}: {e}", path.display())))
    }
}

impl RecordStore for JsonFileRecordStore {
    fn get(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        let path = self.record_path(id)?;
        if !path.is_file() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn put(&self, record: DocumentRecord) -> Result<(), StoreError> {
        let path = self.record_path(&record.id)?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::new("create", format!("{}: {e}", self.dir.display())))?;
        let json = serde_json::to_string_pretty(&record).map_err(|e| StoreError::new("encode", e.to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| StoreError::new("write", format!("{}: {e}", self.dir.display())))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| StoreError::new("write", format!("{}: {e}", tmp.path().display())))?;
        tmp.persist(&path)
            .map(|_| ())
            .map_err(|e| StoreError::new("write", format!("{}: {}", path.display(), e.error)))
    }

    fn list_by_parent(&self, parent: &DocumentId) -> Result<Vec<DocumentRecord>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| r.parent_id.as_ref() == Some(parent))
            .collect())
    }

    fn list(&self) -> Result<Vec<DocumentRecord>, StoreError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| StoreError::new("list", format!("{}: {e}", self.dir.display())))?;

        let mut records = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(e) => e.path(),
                Err(e) => {
                    tracing::warn!(dir = %self.dir.display(), error = %e, "failed to read directory entry while listing records");
                    continue;
                }
            };
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read(&path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable record"),
            }
        }
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }
}
