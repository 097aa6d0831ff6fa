//! Remote embedder backed by a hosted OpenAI-compatible `/embeddings` API.

use async_trait::async_trait;
use docrag_core::{EmbedError, Embedder};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Dimensionality of the hosted embedding space.
pub const REMOTE_DIMENSION: usize = 1536;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the remote embedder.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API key for bearer authentication.
    pub api_key: String,
    /// Base URL of the API (e.g. `https://api.openai.com/v1`).
    pub base_url: String,
    /// Embedding model name.
    pub model: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Config for the default hosted endpoint with the given key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Embedder that calls a hosted embedding API.
///
/// Network and quota failures surface as [`EmbedError`] without internal
/// retries; the request timeout is bounded by [`RemoteConfig::timeout`].
pub struct RemoteEmbedder {
    config: RemoteConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl RemoteEmbedder {
    /// Create a remote embedder. Fails if the HTTP client cannot be built.
    pub fn new(config: RemoteConfig) -> Result<Self, EmbedError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbedError::Network(format!("failed to build http client: {e}")))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dimension(&self) -> usize {
        REMOTE_DIMENSION
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        if self.config.api_key.is_empty() {
            return Err(EmbedError::MissingApiKey);
        }

        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.config.model,
            "input": texts,
        });

        debug!(count = texts.len(), model = %self.config.model, "requesting embeddings");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::Network(format!("invalid embeddings response: {e}")))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbedError::Inference(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // The API may return items out of order; restore input order.
        let mut items = parsed.data;
        items.sort_by_key(|item| item.index);

        for item in &items {
            if item.embedding.len() != REMOTE_DIMENSION {
                return Err(EmbedError::Inference(format!(
                    "embedding has {} dims, expected {REMOTE_DIMENSION}",
                    item.embedding.len()
                )));
            }
        }

        Ok(items.into_iter().map(|item| item.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RemoteConfig::with_api_key("sk-test");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "text-embedding-3-small");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_dimension_is_1536() {
        let embedder = RemoteEmbedder::new(RemoteConfig::with_api_key("sk-test")).unwrap();
        assert_eq!(embedder.dimension(), 1536);
    }

    #[test]
    fn test_model_name() {
        let embedder = RemoteEmbedder::new(RemoteConfig::with_api_key("sk-test")).unwrap();
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_request() {
        let embedder = RemoteEmbedder::new(RemoteConfig::with_api_key("")).unwrap();
        let err = embedder.embed(&["hello"]).await.unwrap_err();
        assert!(matches!(err, EmbedError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_noop() {
        let embedder = RemoteEmbedder::new(RemoteConfig::with_api_key("")).unwrap();
        let vectors = embedder.embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[test]
    fn test_response_parsing_restores_input_order() {
        let raw = r#"{"data":[
            {"index":1,"embedding":[0.2]},
            {"index":0,"embedding":[0.1]}
        ]}"#;
        let mut parsed: EmbeddingsResponse = serde_json::from_str(raw).unwrap();
        parsed.data.sort_by_key(|item| item.index);
        assert_eq!(parsed.data[0].embedding, vec![0.1]);
        assert_eq!(parsed.data[1].embedding, vec![0.2]);
    }
}
