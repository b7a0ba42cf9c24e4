//! OpenAI-compatible embedding client.
//!
//! Works against any endpoint speaking the `/embeddings` batch protocol
//! (OpenRouter, OpenAI, LM Studio, vLLM). Ollama's native
//! `/api/embeddings` route only accepts one prompt per request, so URLs
//! containing it switch to one call per text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EmbeddingError;
use crate::model::{ensure_count, Embedding, EmbeddingProvider};

/// Path fragment identifying Ollama's single-prompt protocol
const OLLAMA_EMBEDDINGS_PATH: &str = "/api/embeddings";

/// Configuration for [`GenericEmbedder`].
#[derive(Debug, Clone)]
pub struct GenericConfig {
    /// Full embeddings URL
    pub embedding_url: String,
    pub model: String,
    /// Sent as a bearer token when present
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
}

impl GenericConfig {
    pub fn new(embedding_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            embedding_url: embedding_url.into(),
            model: model.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key: String = api_key.into();
        self.api_key = if key.is_empty() {
            None
        } else {
            Some(SecretString::from(key))
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when the endpoint speaks Ollama's one-prompt-per-call protocol
    pub fn is_single_prompt(&self) -> bool {
        self.embedding_url.contains(OLLAMA_EMBEDDINGS_PATH)
    }
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct BatchResponse {
    data: Vec<BatchItem>,
}

#[derive(Deserialize)]
struct BatchItem {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct PromptRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct PromptResponse {
    embedding: Vec<f32>,
}

/// `generic` provider.
pub struct GenericEmbedder {
    client: Client,
    config: GenericConfig,
}

impl GenericEmbedder {
    /// Create the client. Fails when the URL or model is blank.
    pub fn new(config: GenericConfig) -> Result<Self, EmbeddingError> {
        if config.model.trim().is_empty() {
            return Err(EmbeddingError::Configuration(
                "generic embedder model is not set".to_string(),
            ));
        }
        if config.embedding_url.trim().is_empty() {
            return Err(EmbeddingError::Configuration(
                "generic embedder embedding_url is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GenericConfig {
        &self.config
    }

    fn post(&self) -> reqwest::RequestBuilder {
        let request = self
            .client
            .post(&self.config.embedding_url)
            .header("Content-Type", "application/json");
        match &self.config.api_key {
            Some(key) => request.header(
                "Authorization",
                format!("Bearer {}", key.expose_secret()),
            ),
            None => request,
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let request = BatchRequest {
            input: texts,
            model: &self.config.model,
        };
        let response = self.post().json(&request).send().await?;
        let body: BatchResponse = parse_json(response).await?;

        ensure_count(texts.len(), body.data.len())?;
        Ok(body
            .data
            .into_iter()
            .map(|item| Embedding::new(item.embedding))
            .collect())
    }

    async fn embed_per_prompt(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let request = PromptRequest {
                model: &self.config.model,
                prompt: text,
            };
            let response = self.post().json(&request).send().await?;
            let body: PromptResponse = parse_json(response).await?;
            embeddings.push(Embedding::new(body.embedding));
        }
        Ok(embeddings)
    }
}

/// Turn a response into `T`, mapping non-2xx statuses and bad bodies.
pub(crate) async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, EmbeddingError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(EmbeddingError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| EmbeddingError::Parse(e.to_string()))
}

#[async_trait]
impl EmbeddingProvider for GenericEmbedder {
    fn name(&self) -> &str {
        "generic"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            count = texts.len(),
            model = %self.config.model,
            single_prompt = self.config.is_single_prompt(),
            "Requesting embeddings"
        );

        if self.config.is_single_prompt() {
            self.embed_per_prompt(texts).await
        } else {
            self.embed_batch(texts).await
        }
    }
}
