//! Embedding provider trait and vector type.
//!
//! Defines the interface for turning text into fixed-length vectors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;

/// Vector embedding as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Wrap a raw vector as returned by the backend.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Create an embedding scaled to unit length.
    /// Zero vectors are kept as-is.
    pub fn normalized(values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            Self {
                values: values.iter().map(|x| x / norm).collect(),
            }
        } else {
            Self { values }
        }
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Squared Euclidean distance to another embedding of the same dimension.
    pub fn squared_l2(&self, other: &Embedding) -> Option<f32> {
        if self.values.len() != other.values.len() {
            return None;
        }
        Some(
            self.values
                .iter()
                .zip(other.values.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum(),
        )
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// Capability shared by every embedding backend.
///
/// `embed` returns exactly one vector per input text, in input order.
/// An empty batch yields an empty result without contacting the backend.
/// Implementations must be thread-safe (Send + Sync) for concurrent use.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Embed an ordered batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut embeddings = self.embed(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::Parse("Provider returned no embedding".to_string()))
    }
}

/// Check that a backend returned one vector per input.
pub(crate) fn ensure_count(expected: usize, actual: usize) -> Result<(), EmbeddingError> {
    if expected != actual {
        return Err(EmbeddingError::Parse(format!(
            "expected {} embeddings, got {}",
            expected, actual
        )));
    }
    Ok(())
}
