//! # rag-vector
//!
//! Persistent vector store for the RAG service.
//!
//! Documents (text, JSON metadata, embedding) live in RocksDB; an
//! approximate nearest-neighbour index over the embeddings lives next to it
//! in a usearch file. The store owns both and keeps them in step.
//!
//! ## Features
//! - Squared Euclidean (L2) distance, nearest first
//! - Sequential, never reused `doc_<n>` ids
//! - Metadata-only updates that leave text and vectors untouched
//! - Fixed dimension per store, recorded on first insert
//! - Index rebuilt from stored embeddings when missing or out of step

pub mod error;
pub mod index;
pub mod records;
pub mod store;

pub use error::VectorError;
pub use index::{HnswConfig, L2Index, INDEX_FILE};
pub use records::{
    DocumentRecord, DocumentRecords, RecordChanges, CF_DOCUMENTS, CF_DOC_IDS, CF_STORE_META,
};
pub use store::{QueryHit, ReplaceOutcome, StoreConfig, StoredDocument, VectorStore};
