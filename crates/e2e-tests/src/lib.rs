//! End-to-end test infrastructure for the RAG service.
//!
//! Provides a shared TestHarness (temporary store, deterministic embedder,
//! retrieval service) and a helper that serves the HTTP API on an
//! ephemeral port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rag_api::{create_cors_layer, create_router, AppState};
use rag_embeddings::{Embedding, EmbeddingError, EmbeddingProvider};
use rag_service::RetrievalService;
use rag_vector::{StoreConfig, VectorStore};

/// Deterministic embedder for tests.
///
/// Texts found in the table get their fixed vector; anything else maps to
/// `[len, 0]`. Every `embed` call is recorded, and the embedder can be
/// switched into a failing mode to exercise provider errors.
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    calls: Mutex<Vec<Vec<String>>>,
    failing: AtomicBool,
}

impl TableEmbedder {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with(mut self, text: &str, vector: &[f32]) -> Self {
        self.table.insert(text.to_string(), vector.to_vec());
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Batches passed to `embed`, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        self.table
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![text.len() as f32, 0.0])
    }
}

impl Default for TableEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for TableEmbedder {
    fn name(&self) -> &str {
        "table"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(texts.to_vec());
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::Request("connection refused".to_string()));
        }
        Ok(texts
            .iter()
            .map(|t| Embedding::new(self.vector_for(t)))
            .collect())
    }
}

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    pub store: Arc<VectorStore>,
    pub embedder: Arc<TableEmbedder>,
    pub service: Arc<RetrievalService>,
}

impl TestHarness {
    /// Harness with the fallback `[len, 0]` embedder.
    pub fn new() -> Self {
        Self::with_embedder(TableEmbedder::new())
    }

    pub fn with_embedder(embedder: TableEmbedder) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            VectorStore::open(StoreConfig::new(temp_dir.path().join("chroma")))
                .expect("Failed to open test store"),
        );
        let embedder = Arc::new(embedder);
        let service = Arc::new(RetrievalService::new(embedder.clone(), store.clone()));

        Self {
            _temp_dir: temp_dir,
            store,
            embedder,
            service,
        }
    }

    /// Ingest `(filename, text)` pairs, panicking on failure.
    pub async fn ingest(&self, docs: &[(&str, &str)]) -> Vec<String> {
        let texts = docs.iter().map(|(_, t)| t.to_string()).collect();
        let filenames = docs.iter().map(|(f, _)| f.to_string()).collect();
        self.service
            .ingest(texts, filenames)
            .await
            .expect("Failed to ingest test documents")
            .doc_ids
    }

    /// Serve the HTTP API on 127.0.0.1 with an ephemeral port; returns the base URL.
    pub async fn spawn_app(&self) -> String {
        let cors = create_cors_layer(&[]).expect("Failed to build CORS layer");
        let app = create_router(AppState::new(self.service.clone()), cors);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        format!("http://{}", addr)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
