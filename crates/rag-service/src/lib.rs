//! # rag-service
//!
//! Retrieval over the vector store: ingest files, search by similarity,
//! list stored files and move them between logical directories.
//!
//! The service is built from an explicit [`Settings`](rag_types::Settings)
//! value or from an already constructed provider and store; it holds no
//! copy of the documents, every read goes through the store.

pub mod error;
pub mod retrieval;
pub mod scoring;

pub use error::ServiceError;
pub use retrieval::{DirectoryUpdateReport, FailedUpdate, IngestReport, RetrievalService, StoreStats};
pub use scoring::{round_score, similarity_from_distance, SCORE_DECIMALS};
