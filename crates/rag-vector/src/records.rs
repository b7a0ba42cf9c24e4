//! Document record storage.
//!
//! Every document (text, metadata, embedding) is one JSON value keyed by its
//! internal u64 key in big-endian form, so iteration order is insertion
//! order. A second column family maps public ids to keys, and a third keeps
//! the store-wide counters.

use std::path::Path;

use rag_types::Metadata;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::VectorError;

/// Column family holding document records
pub const CF_DOCUMENTS: &str = "documents";

/// Column family mapping public id to internal key
pub const CF_DOC_IDS: &str = "doc_ids";

/// Column family holding store counters
pub const CF_STORE_META: &str = "store_meta";

const META_NEXT_KEY: &[u8] = b"next_key";
const META_DIMENSION: &[u8] = b"dimension";

/// One persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Internal key, also the key in the vector index
    pub key: u64,
    /// Public document id
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

/// Changes committed together in one write batch.
#[derive(Debug, Default)]
pub struct RecordChanges {
    pub removed: Vec<DocumentRecord>,
    pub written: Vec<DocumentRecord>,
    pub next_key: Option<u64>,
    pub dimension: Option<usize>,
}

impl RecordChanges {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
            && self.written.is_empty()
            && self.next_key.is_none()
            && self.dimension.is_none()
    }
}

fn read_u64(bytes: &[u8]) -> Result<u64, VectorError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| VectorError::Serialization(format!("expected 8 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(raw))
}

fn decode(bytes: &[u8]) -> Result<DocumentRecord, VectorError> {
    serde_json::from_slice(bytes).map_err(|e| VectorError::Serialization(e.to_string()))
}

/// Document records in RocksDB.
pub struct DocumentRecords {
    db: DB,
}

impl DocumentRecords {
    /// Open or create record storage.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VectorError> {
        let path = path.as_ref();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_DOCUMENTS, CF_DOC_IDS, CF_STORE_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        info!(path = ?path, "Opened document records");
        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily, VectorError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| VectorError::Serialization(format!("column family {} missing", name)))
    }

    fn meta_u64(&self, key: &[u8]) -> Result<Option<u64>, VectorError> {
        match self.db.get_cf(self.cf(CF_STORE_META)?, key)? {
            Some(bytes) => Ok(Some(read_u64(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Next unallocated internal key.
    pub fn next_key(&self) -> Result<u64, VectorError> {
        Ok(self.meta_u64(META_NEXT_KEY)?.unwrap_or(0))
    }

    /// Embedding dimension, once the first document has been written.
    pub fn dimension(&self) -> Result<Option<usize>, VectorError> {
        Ok(self.meta_u64(META_DIMENSION)?.map(|d| d as usize))
    }

    pub fn get(&self, key: u64) -> Result<Option<DocumentRecord>, VectorError> {
        match self.db.get_cf(self.cf(CF_DOCUMENTS)?, key.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn key_for_id(&self, id: &str) -> Result<Option<u64>, VectorError> {
        match self.db.get_cf(self.cf(CF_DOC_IDS)?, id.as_bytes())? {
            Some(bytes) => Ok(Some(read_u64(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, VectorError> {
        match self.key_for_id(id)? {
            Some(key) => self.get(key),
            None => Ok(None),
        }
    }

    pub fn contains_id(&self, id: &str) -> Result<bool, VectorError> {
        Ok(self.key_for_id(id)?.is_some())
    }

    /// All records in insertion order.
    ///
    /// Loads every embedding; meant for listings and index rebuilds.
    pub fn all(&self) -> Result<Vec<DocumentRecord>, VectorError> {
        let mut records = Vec::new();
        for item in self.db.iterator_cf(self.cf(CF_DOCUMENTS)?, IteratorMode::Start) {
            let (_, value) = item?;
            records.push(decode(&value)?);
        }
        Ok(records)
    }

    pub fn count(&self) -> Result<usize, VectorError> {
        let iter = self.db.iterator_cf(self.cf(CF_DOC_IDS)?, IteratorMode::Start);
        Ok(iter.count())
    }

    /// Apply removals, writes and counter updates atomically.
    pub fn commit(&self, changes: &RecordChanges) -> Result<(), VectorError> {
        if changes.is_empty() {
            return Ok(());
        }

        let documents = self.cf(CF_DOCUMENTS)?;
        let doc_ids = self.cf(CF_DOC_IDS)?;
        let meta = self.cf(CF_STORE_META)?;

        let mut batch = WriteBatch::default();
        for record in &changes.removed {
            batch.delete_cf(documents, record.key.to_be_bytes());
            batch.delete_cf(doc_ids, record.id.as_bytes());
        }
        for record in &changes.written {
            let value =
                serde_json::to_vec(record).map_err(|e| VectorError::Serialization(e.to_string()))?;
            batch.put_cf(documents, record.key.to_be_bytes(), value);
            batch.put_cf(doc_ids, record.id.as_bytes(), record.key.to_be_bytes());
        }
        if let Some(next_key) = changes.next_key {
            batch.put_cf(meta, META_NEXT_KEY, next_key.to_be_bytes());
        }
        if let Some(dimension) = changes.dimension {
            batch.put_cf(meta, META_DIMENSION, (dimension as u64).to_be_bytes());
        }

        self.db.write(batch)?;
        debug!(
            removed = changes.removed.len(),
            written = changes.written.len(),
            "Committed record batch"
        );
        Ok(())
    }
}
