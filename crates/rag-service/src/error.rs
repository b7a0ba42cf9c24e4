//! Retrieval service error types.

use rag_embeddings::EmbeddingError;
use rag_types::RagError;
use rag_vector::VectorError;
use thiserror::Error;

/// Errors surfaced by [`RetrievalService`](crate::RetrievalService).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or invalid settings; raised at construction
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Embedding backend failure (transport, status, malformed body)
    #[error("Embedding provider error: {0}")]
    Provider(EmbeddingError),

    /// Caller input rejected before any I/O
    #[error("Validation error: {0}")]
    Validation(String),

    /// Vector store failure
    #[error("Vector store error: {0}")]
    Store(#[from] VectorError),
}

impl ServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }

    /// Unknown document ids
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Store(VectorError::NotFound(_)))
    }
}

impl From<EmbeddingError> for ServiceError {
    fn from(err: EmbeddingError) -> Self {
        if err.is_configuration() {
            ServiceError::Configuration(err.to_string())
        } else {
            ServiceError::Provider(err)
        }
    }
}

impl From<RagError> for ServiceError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::InvalidInput(msg) => ServiceError::Validation(msg),
            other => ServiceError::Configuration(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_embedding_error_maps_to_configuration() {
        let err: ServiceError = EmbeddingError::Configuration("model is not set".into()).into();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[test]
    fn test_transport_error_maps_to_provider() {
        let err: ServiceError = EmbeddingError::Status {
            status: 502,
            body: "bad gateway".into(),
        }
        .into();
        assert!(matches!(err, ServiceError::Provider(_)));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_not_found_classification() {
        let err: ServiceError = VectorError::NotFound("doc_1".into()).into();
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }
}
