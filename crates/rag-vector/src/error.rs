//! Vector store error types.

use thiserror::Error;

/// Errors that can occur during vector store operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Store opened without a persistence location
    #[error("Vector store persist directory is not set")]
    MissingPersistDirectory,

    /// usearch index error
    #[error("Index error: {0}")]
    Index(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Document not found
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Caller-supplied id already present
    #[error("Document id already exists: {0}")]
    DuplicateId(String),

    /// Documents added without vectors
    #[error("Embeddings are required: this store has no embedding function")]
    MissingEmbeddings,

    /// Malformed arguments (length mismatches, empty vectors)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// RocksDB error
    #[error("Database error: {0}")]
    Database(#[from] rocksdb::Error),

    /// Lock poisoned by a panicking writer
    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}
