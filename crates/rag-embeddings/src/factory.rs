//! Backend selection.
//!
//! Settings name the backend with a string tag; it is resolved exactly once
//! into a [`ProviderConfig`] and then into a trait object, so no other code
//! branches on the backend kind.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rag_types::{EmbedderKind, Settings};
use tracing::info;

use crate::azure::{AzureOpenAiConfig, AzureOpenAiEmbedder};
use crate::cache::ModelCache;
use crate::candle::SentenceTransformerEmbedder;
use crate::error::EmbeddingError;
use crate::generic::{GenericConfig, GenericEmbedder};
use crate::model::EmbeddingProvider;

/// Fully resolved backend configuration.
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Generic(GenericConfig),
    AzureOpenAi(AzureOpenAiConfig),
    SentenceTransformer(ModelCache),
}

fn required(value: &Option<String>, section: &str, key: &str) -> Result<String, EmbeddingError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| EmbeddingError::Configuration(format!("[{}] {} is not set", section, key)))
}

impl ProviderConfig {
    /// Resolve the section selected by `embedder.type`.
    pub fn from_settings(settings: &Settings) -> Result<Self, EmbeddingError> {
        let timeout = Duration::from_secs(settings.embedder.request_timeout_secs.max(1));

        match settings.embedder.kind {
            EmbedderKind::Generic => {
                let generic = &settings.generic;
                let config = GenericConfig::new(
                    required(&generic.embedding_url, "generic", "embedding_url")?,
                    required(&generic.model, "generic", "model")?,
                )
                .with_api_key(generic.api_key.clone().unwrap_or_default())
                .with_timeout(timeout);
                Ok(ProviderConfig::Generic(config))
            }
            EmbedderKind::AzureOpenAi => {
                let azure = &settings.azure_openai;
                let config = AzureOpenAiConfig::new(
                    required(&azure.endpoint, "azure_openai", "endpoint")?,
                    required(&azure.deployment_name, "azure_openai", "deployment_name")?,
                    required(&azure.api_key, "azure_openai", "api_key")?,
                )
                .with_api_version(azure.api_version.clone())
                .with_timeout(timeout);
                Ok(ProviderConfig::AzureOpenAi(config))
            }
            EmbedderKind::SentenceTransformer => {
                let local = &settings.sentence_transformer;
                let cache_dir = local.cache_dir.as_ref().map(PathBuf::from);
                Ok(ProviderConfig::SentenceTransformer(ModelCache::for_model(
                    &local.model_name,
                    cache_dir,
                )))
            }
        }
    }

    pub fn kind(&self) -> EmbedderKind {
        match self {
            ProviderConfig::Generic(_) => EmbedderKind::Generic,
            ProviderConfig::AzureOpenAi(_) => EmbedderKind::AzureOpenAi,
            ProviderConfig::SentenceTransformer(_) => EmbedderKind::SentenceTransformer,
        }
    }
}

/// Construct the provider for a resolved configuration.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    info!(backend = config.kind().as_str(), "Building embedding provider");

    let provider: Arc<dyn EmbeddingProvider> = match config {
        ProviderConfig::Generic(c) => Arc::new(GenericEmbedder::new(c.clone())?),
        ProviderConfig::AzureOpenAi(c) => Arc::new(AzureOpenAiEmbedder::new(c.clone())?),
        ProviderConfig::SentenceTransformer(cache) => {
            Arc::new(SentenceTransformerEmbedder::new(cache.clone()))
        }
    };
    Ok(provider)
}
