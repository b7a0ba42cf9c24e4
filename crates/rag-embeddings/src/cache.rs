//! Local model file cache.
//!
//! Sentence-transformer weights are fetched from HuggingFace Hub on first use
//! and kept under the user cache directory, one folder per repository.

use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::EmbeddingError;

/// Repository used when no model is configured
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Organisation prefixed to bare model names
const SENTENCE_TRANSFORMERS_ORG: &str = "sentence-transformers";

/// Files a BERT sentence-transformer needs
pub const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Where model files for one repository live.
#[derive(Debug, Clone)]
pub struct ModelCache {
    pub cache_dir: PathBuf,
    /// HuggingFace repository id, e.g. `sentence-transformers/all-MiniLM-L6-v2`
    pub repo_id: String,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            repo_id: DEFAULT_MODEL_REPO.to_string(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("rag-chroma")
        .join("models")
}

/// Resolve a configured model name to a repository id.
///
/// `all-MiniLM-L6-v2` becomes `sentence-transformers/all-MiniLM-L6-v2`;
/// names that already carry an organisation are kept.
pub fn resolve_repo_id(model_name: &str) -> String {
    let name = model_name.trim();
    if name.is_empty() {
        DEFAULT_MODEL_REPO.to_string()
    } else if name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", SENTENCE_TRANSFORMERS_ORG, name)
    }
}

impl ModelCache {
    pub fn new(cache_dir: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Cache for a configured model name, in `cache_dir` or the user cache.
    pub fn for_model(model_name: &str, cache_dir: Option<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.unwrap_or_else(default_cache_dir),
            repo_id: resolve_repo_id(model_name),
        }
    }

    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    /// True when every file in [`MODEL_FILES`] is present
    pub fn is_cached(&self) -> bool {
        let model_dir = self.model_dir();
        MODEL_FILES.iter().all(|f| model_dir.join(f).exists())
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.model_dir().join(filename)
    }
}

/// Paths to model files
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

/// Get or download model files.
pub fn get_or_download_model(cache: &ModelCache) -> Result<ModelPaths, EmbeddingError> {
    if cache.is_cached() {
        debug!(path = ?cache.model_dir(), "Using cached model");
    } else {
        info!(repo = %cache.repo_id, "Downloading model files");
        download_model_files(cache)?;
    }

    Ok(ModelPaths {
        config: cache.file_path("config.json"),
        tokenizer: cache.file_path("tokenizer.json"),
        weights: cache.file_path("model.safetensors"),
    })
}

fn download_model_files(cache: &ModelCache) -> Result<(), EmbeddingError> {
    use hf_hub::api::sync::Api;

    let api = Api::new().map_err(|e| EmbeddingError::Download(e.to_string()))?;
    let repo = api.model(cache.repo_id.clone());

    std::fs::create_dir_all(cache.model_dir())?;

    for filename in MODEL_FILES {
        let source_path = repo
            .get(filename)
            .map_err(|e| EmbeddingError::Download(format!("{}: {}", filename, e)))?;

        let dest_path = cache.file_path(filename);
        std::fs::copy(&source_path, &dest_path)?;
        debug!(file = filename, dest = ?dest_path, "Downloaded");
    }

    Ok(())
}
