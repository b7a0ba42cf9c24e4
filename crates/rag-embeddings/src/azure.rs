//! Azure OpenAI embedding client.
//!
//! Requests go to
//! `{endpoint}/openai/deployments/{deployment}/embeddings?api-version={version}`
//! with an `api-key` header. The service tags each returned item with the
//! position of its input and does not promise to return them in order.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EmbeddingError;
use crate::generic::parse_json;
use crate::model::{ensure_count, Embedding, EmbeddingProvider};

/// Default Azure OpenAI REST API version
pub const DEFAULT_API_VERSION: &str = "2024-02-01";

/// Configuration for [`AzureOpenAiEmbedder`].
#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,
    pub deployment_name: String,
    pub api_key: SecretString,
    pub api_version: String,
    pub timeout: Duration,
}

impl AzureOpenAiConfig {
    pub fn new(
        endpoint: impl Into<String>,
        deployment_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            deployment_name: deployment_name.into(),
            api_key: SecretString::from(api_key.into()),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Deployment embeddings URL without the query string
    pub fn embeddings_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings",
            self.endpoint.trim_end_matches('/'),
            self.deployment_name
        )
    }
}

#[derive(Serialize)]
struct AzureRequest<'a> {
    input: &'a [String],
}

#[derive(Deserialize)]
struct AzureResponse {
    data: Vec<AzureItem>,
}

#[derive(Deserialize)]
struct AzureItem {
    embedding: Vec<f32>,
    index: usize,
}

/// `azure-openai` provider.
pub struct AzureOpenAiEmbedder {
    client: Client,
    config: AzureOpenAiConfig,
}

impl AzureOpenAiEmbedder {
    /// Create the client. Fails when endpoint, deployment, key or version is blank.
    pub fn new(config: AzureOpenAiConfig) -> Result<Self, EmbeddingError> {
        let missing = [
            ("endpoint", config.endpoint.trim().is_empty()),
            ("deployment_name", config.deployment_name.trim().is_empty()),
            ("api_key", config.api_key.expose_secret().is_empty()),
            ("api_version", config.api_version.trim().is_empty()),
        ];
        if let Some((field, _)) = missing.iter().find(|(_, blank)| *blank) {
            return Err(EmbeddingError::Configuration(format!(
                "azure-openai {} is not set",
                field
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AzureOpenAiConfig {
        &self.config
    }
}

/// Order items by their `index` and check every input position is covered once.
fn into_input_order(
    mut items: Vec<AzureItem>,
    expected: usize,
) -> Result<Vec<Embedding>, EmbeddingError> {
    ensure_count(expected, items.len())?;
    items.sort_by_key(|item| item.index);
    for (position, item) in items.iter().enumerate() {
        if item.index != position {
            return Err(EmbeddingError::Parse(format!(
                "response index {} does not match input position {}",
                item.index, position
            )));
        }
    }
    Ok(items
        .into_iter()
        .map(|item| Embedding::new(item.embedding))
        .collect())
}

#[async_trait]
impl EmbeddingProvider for AzureOpenAiEmbedder {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            count = texts.len(),
            deployment = %self.config.deployment_name,
            "Requesting Azure OpenAI embeddings"
        );

        let response = self
            .client
            .post(self.config.embeddings_url())
            .query(&[("api-version", self.config.api_version.as_str())])
            .header("api-key", self.config.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&AzureRequest { input: texts })
            .send()
            .await?;

        let body: AzureResponse = parse_json(response).await?;
        into_input_order(body.data, texts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_embeddings_url_trims_trailing_slash() {
        let config = AzureOpenAiConfig::new("https://res.openai.azure.com/", "ada", "k");
        assert_eq!(
            config.embeddings_url(),
            "https://res.openai.azure.com/openai/deployments/ada/embeddings"
        );
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
    }

    #[test]
    fn test_missing_deployment_is_configuration_error() {
        let result = AzureOpenAiEmbedder::new(AzureOpenAiConfig::new("https://res", "", "k"));
        match result {
            Err(EmbeddingError::Configuration(msg)) => assert!(msg.contains("deployment_name")),
            _ => panic!("expected configuration error"),
        }
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let result = AzureOpenAiEmbedder::new(AzureOpenAiConfig::new("https://res", "ada", ""));
        assert!(matches!(result, Err(EmbeddingError::Configuration(_))));
    }

    #[test]
    fn test_into_input_order_rejects_gaps() {
        let items = vec![
            AzureItem { embedding: vec![1.0], index: 0 },
            AzureItem { embedding: vec![2.0], index: 2 },
        ];
        assert!(matches!(into_input_order(items, 2), Err(EmbeddingError::Parse(_))));
    }

    #[tokio::test]
    async fn test_out_of_order_response_is_reordered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/embed-3/embeddings"))
            .and(query_param("api-version", "2024-06-01"))
            .and(header("api-key", "azure-key"))
            .and(body_json(json!({ "input": ["first", "second", "third"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "embedding": [3.0], "index": 2 },
                    { "embedding": [1.0], "index": 0 },
                    { "embedding": [2.0], "index": 1 }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = AzureOpenAiConfig::new(format!("{}/", server.uri()), "embed-3", "azure-key")
            .with_api_version("2024-06-01");
        let embedder = AzureOpenAiEmbedder::new(config).unwrap();

        let input: Vec<String> = ["first", "second", "third"].iter().map(|s| s.to_string()).collect();
        let out = embedder.embed(&input).await.unwrap();
        let firsts: Vec<f32> = out.iter().map(|e| e.values[0]).collect();
        assert_eq!(firsts, vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let config = AzureOpenAiConfig::new(server.uri(), "embed-3", "azure-key");
        let embedder = AzureOpenAiEmbedder::new(config).unwrap();

        let err = embedder.embed(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Status { status: 503, .. }));
    }
}
