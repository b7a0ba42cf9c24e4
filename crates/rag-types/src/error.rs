//! Error types for the shared RAG types.

use thiserror::Error;

/// Errors raised while loading settings or handling shared types.
#[derive(Debug, Error)]
pub enum RagError {
    /// Configuration error (missing or invalid setting)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
