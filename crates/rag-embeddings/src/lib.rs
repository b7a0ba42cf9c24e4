//! # rag-embeddings
//!
//! Embedding providers for the RAG retrieval service.
//!
//! Every backend implements the single-capability [`EmbeddingProvider`]
//! trait: an ordered batch of texts in, one vector per text out.
//!
//! ## Backends
//! - [`GenericEmbedder`]: OpenAI-compatible `/embeddings` endpoints, plus the
//!   per-text Ollama `/api/embeddings` protocol
//! - [`AzureOpenAiEmbedder`]: Azure OpenAI deployments (`api-version` query,
//!   index-ordered responses)
//! - [`SentenceTransformerEmbedder`]: local Candle BERT, loaded lazily on first use
//!
//! The backend is chosen once, from settings, via [`ProviderConfig`] and
//! [`build_provider`].

pub mod azure;
pub mod cache;
pub mod candle;
pub mod error;
pub mod factory;
pub mod generic;
pub mod model;

pub use azure::{AzureOpenAiConfig, AzureOpenAiEmbedder};
pub use cache::{get_or_download_model, ModelCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES};
pub use crate::candle::{CandleEmbedder, SentenceTransformerEmbedder};
pub use error::EmbeddingError;
pub use factory::{build_provider, ProviderConfig};
pub use generic::{GenericConfig, GenericEmbedder};
pub use model::{Embedding, EmbeddingProvider};
