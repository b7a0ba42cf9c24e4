//! # rag-types
//!
//! Shared domain types for the RAG retrieval service.
//!
//! This crate defines the data structures exchanged between the vector store,
//! the retrieval service, the HTTP API and the CLI:
//! - Documents: metadata keys and defaults for stored documents
//! - Views: file listings, search hits, directory updates
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use rag_types::{FileEntry, Settings};
//! ```

pub mod config;
pub mod document;
pub mod error;

pub use config::{
    AzureOpenAiSettings, EmbedderKind, EmbedderSettings, GenericSettings, SentenceTransformerSettings,
    ServerSettings, Settings, StoreSettings,
};
pub use document::{
    ingest_timestamp, metadata_str, DirectoryUpdate, FileEntry, Metadata, SearchHit,
    DEFAULT_CREATED_AT, DEFAULT_DIRECTORY, KEY_CREATED_AT, KEY_DIRECTORY, KEY_FILENAME,
    UNKNOWN_FILENAME,
};
pub use error::RagError;
