//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Required backend setting is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport failure (connect, timeout, TLS)
    #[error("Embedding request failed: {0}")]
    Request(String),

    /// Backend answered with a non-2xx status
    #[error("Embedding API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body missing expected fields or otherwise malformed
    #[error("Failed to parse embedding response: {0}")]
    Parse(String),

    /// Candle model error
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    /// Tokenizer error
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Model file not found
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    /// Download error
    #[error("Failed to download model: {0}")]
    Download(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EmbeddingError {
    /// True for errors raised because the backend is misconfigured,
    /// as opposed to failures while talking to it.
    pub fn is_configuration(&self) -> bool {
        matches!(self, EmbeddingError::Configuration(_))
    }
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            EmbeddingError::Parse(e.to_string())
        } else {
            EmbeddingError::Request(e.to_string())
        }
    }
}
