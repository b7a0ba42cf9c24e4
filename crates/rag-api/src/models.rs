//! Request and response bodies.

use rag_types::{DirectoryUpdate, FileEntry, SearchHit};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default similarity threshold for searches
pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// Default number of results for searches
pub const DEFAULT_N_RESULTS: usize = 5;

/// Largest `n_results` accepted
pub const MAX_N_RESULTS: usize = 100;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_n_results() -> usize {
    DEFAULT_N_RESULTS
}

/// Successful response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,
    #[serde(default = "default_threshold")]
    #[validate(range(min = 0.0, max = 1.0, message = "threshold must be between 0 and 1"))]
    pub threshold: f64,
    #[serde(default = "default_n_results")]
    #[validate(range(min = 1, max = 100, message = "n_results must be between 1 and 100"))]
    pub n_results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchData {
    pub query: String,
    pub threshold: f64,
    pub hit_count: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilesData {
    pub files: Vec<FileEntry>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DocumentInput {
    #[validate(length(min = 1, message = "filename must not be empty"))]
    pub filename: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IngestRequest {
    #[validate(length(min = 1, message = "at least one document is required"), nested)]
    pub documents: Vec<DocumentInput>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDirectoriesRequest {
    #[validate(length(min = 1, message = "at least one update is required"))]
    pub updates: Vec<DirectoryUpdate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveData {
    pub filename: String,
    pub removed: usize,
}
