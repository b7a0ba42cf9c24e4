//! Persistent vector store.
//!
//! Owns the document records and the similarity index and keeps them in
//! step. Reads share the index lock; every mutation runs under a single
//! writer mutex so id allocation, the record batch and the index update form
//! one critical section.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use rag_embeddings::Embedding;
use rag_types::{metadata_str, Metadata, StoreSettings, KEY_FILENAME};
use tracing::{debug, info, warn};

use crate::error::VectorError;
use crate::index::{HnswConfig, L2Index};
use crate::records::{DocumentRecord, DocumentRecords, RecordChanges};

const RECORDS_DIR: &str = "records";
const INDEX_DIR: &str = "index";

/// Store location and index tuning.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub persist_directory: PathBuf,
    pub index: HnswConfig,
}

impl StoreConfig {
    pub fn new(persist_directory: impl Into<PathBuf>) -> Self {
        Self {
            persist_directory: persist_directory.into(),
            index: HnswConfig::default(),
        }
    }

    /// Location and HNSW tuning from the `[store]` settings section.
    pub fn from_settings(settings: &StoreSettings) -> Self {
        let index = HnswConfig::default()
            .with_connectivity(settings.index_connectivity)
            .with_expansion(settings.index_expansion_add, settings.index_expansion_search);
        Self::new(settings.expanded_persist_directory()).with_index(index)
    }

    pub fn with_index(mut self, index: HnswConfig) -> Self {
        self.index = index;
        self
    }
}

/// A document as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    pub embedding: Embedding,
}

impl From<DocumentRecord> for StoredDocument {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: record.id,
            text: record.text,
            metadata: record.metadata,
            embedding: Embedding::new(record.embedding),
        }
    }
}

/// One nearest-neighbour result.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    /// Squared Euclidean distance to the query vector
    pub distance: f32,
}

/// Result of [`VectorStore::replace_by_filename`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Ids of the new documents, in input order
    pub ids: Vec<String>,
    /// Number of previous documents removed
    pub removed: usize,
}

/// Vector store over RocksDB records and a usearch index.
pub struct VectorStore {
    config: StoreConfig,
    records: DocumentRecords,
    /// `None` until the first document fixes the dimension
    index: RwLock<Option<L2Index>>,
    writer: Mutex<()>,
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> VectorError {
    VectorError::Poisoned(err.to_string())
}

impl VectorStore {
    /// Open or create a store under `config.persist_directory`.
    ///
    /// The index is rebuilt from stored embeddings when its file is missing,
    /// unreadable or holds a different number of vectors than the records.
    pub fn open(config: StoreConfig) -> Result<Self, VectorError> {
        if config.persist_directory.as_os_str().is_empty() {
            return Err(VectorError::MissingPersistDirectory);
        }
        std::fs::create_dir_all(&config.persist_directory)?;

        let records = DocumentRecords::open(config.persist_directory.join(RECORDS_DIR))?;
        let store = Self {
            config,
            records,
            index: RwLock::new(None),
            writer: Mutex::new(()),
        };

        if let Some(dimension) = store.records.dimension()? {
            let count = store.records.count()?;
            let loaded = match L2Index::load(&store.index_dir(), dimension, &store.config.index) {
                Ok(index) if index.len() == count => Some(index),
                Ok(index) => {
                    warn!(indexed = index.len(), records = count, "Index out of step with records");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Vector index unavailable");
                    None
                }
            };

            let index = match loaded {
                Some(index) => index,
                None => store.build_index(dimension)?,
            };
            *store.index.write().map_err(poisoned)? = Some(index);
        }

        info!(
            path = ?store.config.persist_directory,
            documents = store.records.count()?,
            "Opened vector store"
        );
        Ok(store)
    }

    pub fn persist_directory(&self) -> &Path {
        &self.config.persist_directory
    }

    fn index_dir(&self) -> PathBuf {
        self.config.persist_directory.join(INDEX_DIR)
    }

    /// Build and save a fresh index from the persisted embeddings.
    fn build_index(&self, dimension: usize) -> Result<L2Index, VectorError> {
        let all = self.records.all()?;
        let capacity = all.len().max(self.config.index.initial_capacity);
        let config = self.config.index.clone().with_capacity(capacity);
        let index = L2Index::create(&self.index_dir(), dimension, &config)?;
        for record in &all {
            index.add(record.key, &record.embedding)?;
        }
        index.save()?;
        info!(vectors = all.len(), "Rebuilt vector index from records");
        Ok(index)
    }

    /// Discard the index file and rebuild it from stored embeddings.
    pub fn rebuild_index(&self) -> Result<usize, VectorError> {
        let _guard = self.writer.lock().map_err(poisoned)?;
        let Some(dimension) = self.records.dimension()? else {
            return Ok(0);
        };
        let index = self.build_index(dimension)?;
        let len = index.len();
        *self.index.write().map_err(poisoned)? = Some(index);
        Ok(len)
    }

    /// Embedding dimension, once fixed by the first add.
    pub fn dimension(&self) -> Result<Option<usize>, VectorError> {
        self.records.dimension()
    }

    pub fn count(&self) -> Result<usize, VectorError> {
        self.records.count()
    }

    pub fn get(&self, id: &str) -> Result<Option<StoredDocument>, VectorError> {
        Ok(self.records.get_by_id(id)?.map(StoredDocument::from))
    }

    /// Every document in insertion order.
    pub fn get_all(&self) -> Result<Vec<StoredDocument>, VectorError> {
        Ok(self
            .records
            .all()?
            .into_iter()
            .map(StoredDocument::from)
            .collect())
    }

    /// Add documents with precomputed embeddings.
    ///
    /// Ids are allocated as `doc_<n>` unless supplied. Returns the ids in
    /// input order.
    pub fn add(
        &self,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        embeddings: Option<Vec<Embedding>>,
        ids: Option<Vec<String>>,
    ) -> Result<Vec<String>, VectorError> {
        let _guard = self.writer.lock().map_err(poisoned)?;
        let changes = self.stage(texts, metadatas, embeddings, ids, &HashSet::new())?;
        let ids = changes.written.iter().map(|r| r.id.clone()).collect();
        self.apply(changes)?;
        Ok(ids)
    }

    /// Remove every document whose filename matches one of the incoming
    /// documents, and add the incoming ones, as one write.
    pub fn replace_by_filename(
        &self,
        texts: Vec<String>,
        metadatas: Vec<Metadata>,
        embeddings: Vec<Embedding>,
    ) -> Result<ReplaceOutcome, VectorError> {
        let _guard = self.writer.lock().map_err(poisoned)?;

        let filenames: HashSet<&str> = metadatas
            .iter()
            .filter_map(|m| metadata_str(m, KEY_FILENAME))
            .collect();
        let previous: Vec<DocumentRecord> = self
            .records
            .all()?
            .into_iter()
            .filter(|r| {
                metadata_str(&r.metadata, KEY_FILENAME).is_some_and(|f| filenames.contains(f))
            })
            .collect();
        let replaced: HashSet<String> = previous.iter().map(|r| r.id.clone()).collect();

        let mut changes = self.stage(texts, Some(metadatas), Some(embeddings), None, &replaced)?;
        changes.removed = previous;

        let outcome = ReplaceOutcome {
            ids: changes.written.iter().map(|r| r.id.clone()).collect(),
            removed: changes.removed.len(),
        };
        self.apply(changes)?;
        Ok(outcome)
    }

    /// Validate new documents and allocate their keys and ids.
    /// `released` ids are being removed in the same write and may be reused
    /// by callers that supply ids.
    fn stage(
        &self,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        embeddings: Option<Vec<Embedding>>,
        ids: Option<Vec<String>>,
        released: &HashSet<String>,
    ) -> Result<RecordChanges, VectorError> {
        let embeddings = embeddings.ok_or(VectorError::MissingEmbeddings)?;
        let count = texts.len();

        if embeddings.len() != count {
            return Err(VectorError::InvalidInput(format!(
                "{} texts but {} embeddings",
                count,
                embeddings.len()
            )));
        }
        let metadatas = match metadatas {
            Some(m) if m.len() != count => {
                return Err(VectorError::InvalidInput(format!(
                    "{} texts but {} metadatas",
                    count,
                    m.len()
                )))
            }
            Some(m) => m,
            None => vec![Metadata::new(); count],
        };
        if let Some(ids) = &ids {
            if ids.len() != count {
                return Err(VectorError::InvalidInput(format!(
                    "{} texts but {} ids",
                    count,
                    ids.len()
                )));
            }
        }

        let stored_dimension = self.records.dimension()?;
        let expected = stored_dimension.or_else(|| embeddings.first().map(Embedding::dimension));
        if let Some(expected) = expected {
            if expected == 0 {
                return Err(VectorError::InvalidInput("empty embedding".to_string()));
            }
            if let Some(bad) = embeddings.iter().find(|e| e.dimension() != expected) {
                return Err(VectorError::DimensionMismatch {
                    expected,
                    actual: bad.dimension(),
                });
            }
        }

        let mut next_key = self.records.next_key()?;
        let mut taken: HashSet<String> = HashSet::new();
        let mut written = Vec::with_capacity(count);

        let mut supplied = ids.map(Vec::into_iter);
        for ((text, metadata), embedding) in texts.into_iter().zip(metadatas).zip(embeddings) {
            let key = next_key;
            next_key += 1;

            let id = match supplied.as_mut().and_then(Iterator::next) {
                Some(id) => {
                    let in_store = self.records.contains_id(&id)? && !released.contains(&id);
                    if in_store || taken.contains(&id) {
                        return Err(VectorError::DuplicateId(id));
                    }
                    id
                }
                None => {
                    let mut candidate = format!("doc_{}", key);
                    while self.records.contains_id(&candidate)? || taken.contains(&candidate) {
                        next_key += 1;
                        candidate = format!("doc_{}", next_key - 1);
                    }
                    candidate
                }
            };
            taken.insert(id.clone());

            written.push(DocumentRecord {
                key,
                id,
                text,
                metadata,
                embedding: embedding.values,
            });
        }

        Ok(RecordChanges {
            removed: Vec::new(),
            written,
            next_key: Some(next_key),
            dimension: if stored_dimension.is_none() { expected } else { None },
        })
    }

    /// Commit record changes, then bring the index in step and save it.
    /// Caller holds the writer lock.
    fn apply(&self, changes: RecordChanges) -> Result<(), VectorError> {
        if changes.removed.is_empty() && changes.written.is_empty() {
            return Ok(());
        }
        self.records.commit(&changes)?;

        let mut slot = self.index.write().map_err(poisoned)?;
        if slot.is_none() {
            if let Some(dimension) = self.records.dimension()? {
                *slot = Some(L2Index::create(&self.index_dir(), dimension, &self.config.index)?);
            }
        }
        if let Some(index) = slot.as_ref() {
            for record in &changes.removed {
                index.remove(record.key)?;
            }
            for record in &changes.written {
                index.add(record.key, &record.embedding)?;
            }
            index.save()?;
        }

        debug!(
            removed = changes.removed.len(),
            added = changes.written.len(),
            "Applied store changes"
        );
        Ok(())
    }

    /// Up to `limit` nearest documents, nearest first.
    pub fn query(&self, vector: &Embedding, limit: usize) -> Result<Vec<QueryHit>, VectorError> {
        let slot = self.index.read().map_err(poisoned)?;
        let Some(index) = slot.as_ref() else {
            return Ok(Vec::new());
        };
        if vector.dimension() != index.dimension() {
            return Err(VectorError::DimensionMismatch {
                expected: index.dimension(),
                actual: vector.dimension(),
            });
        }

        let mut hits = Vec::new();
        for (key, distance) in index.search(&vector.values, limit)? {
            match self.records.get(key)? {
                Some(record) => hits.push(QueryHit {
                    id: record.id,
                    text: record.text,
                    metadata: record.metadata,
                    distance,
                }),
                None => warn!(key = key, "Indexed vector has no record"),
            }
        }
        Ok(hits)
    }

    /// Delete documents by id; unknown ids are skipped. Returns how many went.
    pub fn delete(&self, ids: &[String]) -> Result<usize, VectorError> {
        let _guard = self.writer.lock().map_err(poisoned)?;
        let mut removed = Vec::new();
        for id in ids {
            if let Some(record) = self.records.get_by_id(id)? {
                removed.push(record);
            }
        }
        let count = removed.len();
        self.apply(RecordChanges {
            removed,
            ..Default::default()
        })?;
        Ok(count)
    }

    /// Delete every document whose `filename` metadata equals `filename`.
    pub fn delete_by_filename(&self, filename: &str) -> Result<usize, VectorError> {
        let _guard = self.writer.lock().map_err(poisoned)?;
        let removed: Vec<DocumentRecord> = self
            .records
            .all()?
            .into_iter()
            .filter(|r| metadata_str(&r.metadata, KEY_FILENAME) == Some(filename))
            .collect();
        let count = removed.len();
        self.apply(RecordChanges {
            removed,
            ..Default::default()
        })?;
        if count > 0 {
            info!(filename = %filename, removed = count, "Deleted documents by filename");
        }
        Ok(count)
    }

    /// Replace the metadata of `id`. Text, embedding and index are untouched.
    pub fn update_metadata(&self, id: &str, metadata: Metadata) -> Result<(), VectorError> {
        let _guard = self.writer.lock().map_err(poisoned)?;
        let mut record = self
            .records
            .get_by_id(id)?
            .ok_or_else(|| VectorError::NotFound(id.to_string()))?;
        record.metadata = metadata;
        self.records.commit(&RecordChanges {
            written: vec![record],
            ..Default::default()
        })?;
        debug!(id = %id, "Updated metadata");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn meta(filename: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert("filename".to_string(), json!(filename));
        m
    }

    fn emb(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec())
    }

    fn open(temp: &TempDir) -> VectorStore {
        VectorStore::open(StoreConfig::new(temp.path())).unwrap()
    }

    #[test]
    fn test_empty_persist_directory_rejected() {
        let result = VectorStore::open(StoreConfig::new(""));
        assert!(matches!(result, Err(VectorError::MissingPersistDirectory)));
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        let ids = store
            .add(
                vec!["a".into(), "b".into()],
                None,
                Some(vec![emb(&[0.0, 0.0]), emb(&[1.0, 1.0])]),
                None,
            )
            .unwrap();
        assert_eq!(ids, vec!["doc_0", "doc_1"]);

        let more = store
            .add(vec!["c".into()], None, Some(vec![emb(&[2.0, 2.0])]), None)
            .unwrap();
        assert_eq!(more, vec!["doc_2"]);
        assert_eq!(store.count().unwrap(), 3);
        assert_eq!(store.dimension().unwrap(), Some(2));
        assert!(store.get("doc_0").unwrap().unwrap().metadata.is_empty());
    }

    #[test]
    fn test_add_without_embeddings_rejected() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        let result = store.add(vec!["a".into()], None, None, None);
        assert!(matches!(result, Err(VectorError::MissingEmbeddings)));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        let result = store.add(vec!["a".into(), "b".into()], None, Some(vec![emb(&[1.0])]), None);
        assert!(matches!(result, Err(VectorError::InvalidInput(_))));
    }

    #[test]
    fn test_supplied_ids_and_duplicates() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        let ids = store
            .add(vec!["a".into()], None, Some(vec![emb(&[1.0])]), Some(vec!["mine".into()]))
            .unwrap();
        assert_eq!(ids, vec!["mine"]);

        let dup = store.add(vec!["b".into()], None, Some(vec![emb(&[2.0])]), Some(vec!["mine".into()]));
        assert!(matches!(dup, Err(VectorError::DuplicateId(id)) if id == "mine"));
    }

    #[test]
    fn test_auto_ids_skip_supplied_collisions() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        store
            .add(vec!["a".into()], None, Some(vec![emb(&[1.0])]), Some(vec!["doc_1".into()]))
            .unwrap();
        let ids = store
            .add(vec!["b".into()], None, Some(vec![emb(&[2.0])]), None)
            .unwrap();
        assert_eq!(ids, vec!["doc_2"]);
    }

    #[test]
    fn test_dimension_fixed_by_first_add() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        store
            .add(vec!["a".into()], None, Some(vec![emb(&[1.0, 2.0])]), None)
            .unwrap();

        let add = store.add(vec!["b".into()], None, Some(vec![emb(&[1.0, 2.0, 3.0])]), None);
        assert!(matches!(add, Err(VectorError::DimensionMismatch { expected: 2, actual: 3 })));

        let query = store.query(&emb(&[1.0]), 3);
        assert!(matches!(query, Err(VectorError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_query_orders_by_distance() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        store
            .add(
                vec!["far".into(), "near".into(), "mid".into()],
                Some(vec![meta("far.txt"), meta("near.txt"), meta("mid.txt")]),
                Some(vec![emb(&[3.0, 0.0]), emb(&[0.0, 0.0]), emb(&[1.0, 0.0])]),
                None,
            )
            .unwrap();

        let hits = store.query(&emb(&[0.0, 0.0]), 2).unwrap();
        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["near", "mid"]);
        assert_eq!(hits[0].distance, 0.0);
        assert!((hits[1].distance - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_query_empty_store() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        assert!(store.query(&emb(&[1.0, 2.0]), 5).unwrap().is_empty());
    }

    #[test]
    fn test_delete_by_filename() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        store
            .add(
                vec!["a1".into(), "b".into(), "a2".into()],
                Some(vec![meta("a.txt"), meta("b.txt"), meta("a.txt")]),
                Some(vec![emb(&[0.0]), emb(&[1.0]), emb(&[2.0])]),
                None,
            )
            .unwrap();

        assert_eq!(store.delete_by_filename("a.txt").unwrap(), 2);
        assert_eq!(store.delete_by_filename("a.txt").unwrap(), 0);
        assert_eq!(store.delete_by_filename("missing.txt").unwrap(), 0);

        let left: Vec<String> = store.get_all().unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(left, vec!["doc_1"]);
        let hits = store.query(&emb(&[0.0]), 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "b");
    }

    #[test]
    fn test_delete_by_id() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        store
            .add(vec!["a".into(), "b".into()], None, Some(vec![emb(&[0.0]), emb(&[1.0])]), None)
            .unwrap();

        let removed = store
            .delete(&["doc_0".to_string(), "nope".to_string()])
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("doc_0").unwrap().is_none());
    }

    #[test]
    fn test_replace_by_filename_swaps_documents() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        store
            .add(
                vec!["old".into(), "other".into()],
                Some(vec![meta("a.txt"), meta("b.txt")]),
                Some(vec![emb(&[0.0]), emb(&[5.0])]),
                None,
            )
            .unwrap();

        let outcome = store
            .replace_by_filename(vec!["new".into()], vec![meta("a.txt")], vec![emb(&[1.0])])
            .unwrap();
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.ids, vec!["doc_2"]);

        let docs = store.get_all().unwrap();
        let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["other", "new"]);
    }

    #[test]
    fn test_replace_rejects_bad_dimension_without_deleting() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        store
            .add(vec!["old".into()], Some(vec![meta("a.txt")]), Some(vec![emb(&[0.0, 0.0])]), None)
            .unwrap();

        let result = store.replace_by_filename(vec!["new".into()], vec![meta("a.txt")], vec![emb(&[1.0])]);
        assert!(result.is_err());
        assert_eq!(store.get("doc_0").unwrap().unwrap().text, "old");
    }

    #[test]
    fn test_update_metadata_leaves_text_and_embedding() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        store
            .add(vec!["hello".into()], Some(vec![meta("a.txt")]), Some(vec![emb(&[0.5, 0.5])]), None)
            .unwrap();

        let mut updated = meta("a.txt");
        updated.insert("directory".to_string(), json!("/reports"));
        store.update_metadata("doc_0", updated.clone()).unwrap();

        let doc = store.get("doc_0").unwrap().unwrap();
        assert_eq!(doc.metadata, updated);
        assert_eq!(doc.text, "hello");
        assert_eq!(doc.embedding, emb(&[0.5, 0.5]));
        assert_eq!(store.query(&emb(&[0.5, 0.5]), 1).unwrap()[0].id, "doc_0");
    }

    #[test]
    fn test_update_metadata_unknown_id() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        let result = store.update_metadata("doc_9", Metadata::new());
        assert!(matches!(result, Err(VectorError::NotFound(id)) if id == "doc_9"));
    }

    #[test]
    fn test_ids_not_reused_after_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let store = open(&temp);
            store
                .add(vec!["a".into(), "b".into()], None, Some(vec![emb(&[0.0]), emb(&[1.0])]), None)
                .unwrap();
            store.delete(&["doc_1".to_string()]).unwrap();
        }

        let store = open(&temp);
        let ids = store
            .add(vec!["c".into()], None, Some(vec![emb(&[2.0])]), None)
            .unwrap();
        assert_eq!(ids, vec!["doc_2"]);
        assert_eq!(store.query(&emb(&[2.0]), 1).unwrap()[0].text, "c");
    }

    #[test]
    fn test_missing_index_rebuilt_on_open() {
        let temp = TempDir::new().unwrap();
        {
            let store = open(&temp);
            store
                .add(vec!["a".into(), "b".into()], None, Some(vec![emb(&[0.0, 0.0]), emb(&[3.0, 4.0])]), None)
                .unwrap();
        }
        std::fs::remove_file(temp.path().join("index").join(crate::INDEX_FILE)).unwrap();

        let store = open(&temp);
        let hits = store.query(&emb(&[3.0, 4.0]), 1).unwrap();
        assert_eq!(hits[0].id, "doc_1");
        assert_eq!(store.rebuild_index().unwrap(), 2);
    }

    #[test]
    fn test_store_config_from_settings() {
        let temp = TempDir::new().unwrap();
        let settings = StoreSettings {
            persist_directory: temp.path().to_string_lossy().to_string(),
            index_connectivity: 8,
            index_expansion_add: 64,
            index_expansion_search: 32,
        };

        let config = StoreConfig::from_settings(&settings);
        assert_eq!(config.persist_directory, temp.path());
        assert_eq!(config.index.connectivity, 8);
        assert_eq!(config.index.expansion_add, 64);
        assert_eq!(config.index.expansion_search, 32);

        let store = VectorStore::open(config).unwrap();
        store
            .add(vec!["a".into(), "b".into()], None, Some(vec![emb(&[0.0, 1.0]), emb(&[5.0, 5.0])]), None)
            .unwrap();
        assert_eq!(store.query(&emb(&[0.0, 1.0]), 1).unwrap()[0].id, "doc_0");
    }
}
