//! Retrieval service.
//!
//! Composes an [`EmbeddingProvider`] with the [`VectorStore`]. Ingest embeds
//! the whole batch before touching the store, then swaps out earlier
//! documents with the same filenames in one write, so a failed embedding
//! call leaves the store as it was.

use std::collections::HashSet;
use std::sync::Arc;

use rag_embeddings::{build_provider, EmbeddingProvider, ProviderConfig};
use rag_types::{
    ingest_timestamp, metadata_str, DirectoryUpdate, FileEntry, Metadata, SearchHit, Settings,
    DEFAULT_DIRECTORY, KEY_CREATED_AT, KEY_DIRECTORY, KEY_FILENAME, UNKNOWN_FILENAME,
};
use rag_vector::{StoreConfig, VectorStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::scoring::{round_score, similarity_from_distance};

/// Outcome of an ingest call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// New document ids, in input order
    pub doc_ids: Vec<String>,
    /// Earlier documents replaced because they shared a filename
    pub replaced: usize,
}

/// One directory update that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUpdate {
    pub doc_id: String,
    pub error: String,
}

/// Outcome of a batch of directory updates. Every entry is attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUpdateReport {
    pub updated: Vec<String>,
    pub failed: Vec<FailedUpdate>,
}

impl DirectoryUpdateReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Store summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub document_count: usize,
    pub dimension: Option<usize>,
    pub provider: String,
}

/// Ingest, search, listing and metadata updates over one store.
pub struct RetrievalService {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<VectorStore>,
}

impl RetrievalService {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Build the configured provider and open the configured store.
    pub fn from_settings(settings: &Settings) -> Result<Self, ServiceError> {
        let provider_config = ProviderConfig::from_settings(settings)?;
        let embedder = build_provider(&provider_config)?;

        let store = VectorStore::open(StoreConfig::from_settings(&settings.store))?;

        info!(
            provider = embedder.name(),
            path = ?store.persist_directory(),
            "Retrieval service ready"
        );
        Ok(Self::new(embedder, Arc::new(store)))
    }

    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    pub fn provider_name(&self) -> &str {
        self.embedder.name()
    }

    /// Store `texts` under `filenames`, replacing earlier documents with the
    /// same filenames. All texts are embedded in one provider call.
    pub async fn ingest(
        &self,
        texts: Vec<String>,
        filenames: Vec<String>,
    ) -> Result<IngestReport, ServiceError> {
        if texts.is_empty() {
            return Err(ServiceError::Validation("no documents to ingest".to_string()));
        }
        if texts.len() != filenames.len() {
            return Err(ServiceError::Validation(format!(
                "{} texts but {} filenames",
                texts.len(),
                filenames.len()
            )));
        }
        let mut seen = HashSet::new();
        for filename in &filenames {
            if filename.trim().is_empty() {
                return Err(ServiceError::Validation("filename must not be blank".to_string()));
            }
            if !seen.insert(filename.as_str()) {
                return Err(ServiceError::Validation(format!(
                    "duplicate filename in batch: {}",
                    filename
                )));
            }
        }

        let embeddings = self.embedder.embed(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(ServiceError::Provider(rag_embeddings::EmbeddingError::Parse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            ))));
        }

        let created_at = ingest_timestamp();
        let metadatas: Vec<Metadata> = filenames
            .into_iter()
            .map(|filename| {
                let mut metadata = Metadata::new();
                metadata.insert(KEY_FILENAME.to_string(), Value::String(filename));
                metadata.insert(KEY_CREATED_AT.to_string(), Value::String(created_at.clone()));
                metadata.insert(
                    KEY_DIRECTORY.to_string(),
                    Value::String(DEFAULT_DIRECTORY.to_string()),
                );
                metadata
            })
            .collect();

        let outcome = self.store.replace_by_filename(texts, metadatas, embeddings)?;
        info!(
            added = outcome.ids.len(),
            replaced = outcome.removed,
            "Ingested documents"
        );
        Ok(IngestReport {
            doc_ids: outcome.ids,
            replaced: outcome.removed,
        })
    }

    /// Up to `limit` documents whose similarity to `query` is at least
    /// `threshold`, best first. No match is an empty result, not an error.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        threshold: f64,
    ) -> Result<Vec<SearchHit>, ServiceError> {
        if query.trim().is_empty() {
            return Err(ServiceError::Validation("query must not be empty".to_string()));
        }
        if limit == 0 {
            return Err(ServiceError::Validation("limit must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ServiceError::Validation(format!(
                "threshold must be between 0 and 1, got {}",
                threshold
            )));
        }

        let vector = self.embedder.embed_one(query).await?;
        let hits = self.store.query(&vector, limit)?;
        let candidates = hits.len();

        let results: Vec<SearchHit> = hits
            .into_iter()
            .map(|hit| (similarity_from_distance(hit.distance), hit))
            .filter(|(similarity, _)| *similarity >= threshold)
            .enumerate()
            .map(|(i, (similarity, hit))| SearchHit {
                rank: i + 1,
                filename: metadata_str(&hit.metadata, KEY_FILENAME)
                    .unwrap_or(UNKNOWN_FILENAME)
                    .to_string(),
                score: round_score(similarity),
                document: hit.text,
                created_at: metadata_str(&hit.metadata, KEY_CREATED_AT).map(str::to_string),
            })
            .collect();

        debug!(
            candidates = candidates,
            kept = results.len(),
            threshold = threshold,
            "Search complete"
        );
        Ok(results)
    }

    /// One entry per stored document, in insertion order.
    pub fn list_files(&self) -> Result<Vec<FileEntry>, ServiceError> {
        Ok(self
            .store
            .get_all()?
            .iter()
            .map(|doc| FileEntry::from_metadata(doc.id.clone(), &doc.metadata))
            .collect())
    }

    /// Move documents to new logical directories. Only `directory` changes;
    /// each entry is attempted even when an earlier one fails.
    pub fn update_directories(
        &self,
        updates: &[DirectoryUpdate],
    ) -> Result<DirectoryUpdateReport, ServiceError> {
        let mut report = DirectoryUpdateReport::default();

        for update in updates {
            match self.update_directory(update) {
                Ok(()) => report.updated.push(update.doc_id.clone()),
                Err(e) => {
                    warn!(doc_id = %update.doc_id, error = %e, "Directory update failed");
                    report.failed.push(FailedUpdate {
                        doc_id: update.doc_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            updated = report.updated.len(),
            failed = report.failed.len(),
            "Applied directory updates"
        );
        Ok(report)
    }

    fn update_directory(&self, update: &DirectoryUpdate) -> Result<(), ServiceError> {
        if update.new_directory.trim().is_empty() {
            return Err(ServiceError::Validation("directory must not be blank".to_string()));
        }
        let document = self
            .store
            .get(&update.doc_id)?
            .ok_or_else(|| rag_vector::VectorError::NotFound(update.doc_id.clone()))?;

        let mut metadata = document.metadata;
        metadata.insert(
            KEY_DIRECTORY.to_string(),
            Value::String(update.new_directory.clone()),
        );
        self.store.update_metadata(&update.doc_id, metadata)?;
        Ok(())
    }

    /// Delete every document stored under `filename`. Returns how many went.
    pub fn remove_file(&self, filename: &str) -> Result<usize, ServiceError> {
        if filename.trim().is_empty() {
            return Err(ServiceError::Validation("filename must not be blank".to_string()));
        }
        Ok(self.store.delete_by_filename(filename)?)
    }

    pub fn stats(&self) -> Result<StoreStats, ServiceError> {
        Ok(StoreStats {
            document_count: self.store.count()?,
            dimension: self.store.dimension()?,
            provider: self.embedder.name().to_string(),
        })
    }
}
