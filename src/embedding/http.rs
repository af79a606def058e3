//! OpenAI-compatible HTTP embedding provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;
use crate::error::IndexError;

/// Embedding provider backed by an OpenAI-compatible `/embeddings` endpoint.
///
/// The configured model identifier is passed through opaquely; the service
/// behind the endpoint decides what weights it loads. Every failure on this
/// path — transport, status, malformed body — surfaces as
/// [`IndexError::EmbeddingUnavailable`].
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, IndexError> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            IndexError::InvalidConfig("embedding endpoint is required for the http backend".into())
        })?;
        Url::parse(endpoint).map_err(|err| {
            IndexError::InvalidConfig(format!("invalid embedding endpoint '{endpoint}': {err}"))
        })?;
        let client = Client::builder()
            .build()
            .map_err(|err| IndexError::EmbeddingUnavailable(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
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

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexError> {
        let mut request = self
            .client
            .post(format!("{}/embeddings", self.endpoint))
            .json(&json!({ "model": self.model, "input": texts }));
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| IndexError::EmbeddingUnavailable(err.to_string()))?
            .error_for_status()
            .map_err(|err| IndexError::EmbeddingUnavailable(err.to_string()))?;

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|err| IndexError::EmbeddingUnavailable(err.to_string()))?;

        if body.data.len() != texts.len() {
            return Err(IndexError::EmbeddingUnavailable(format!(
                "endpoint returned {} embeddings for {} inputs",
                body.data.len(),
                texts.len()
            )));
        }

        // Responses are allowed to arrive out of order; `index` restores the
        // 1:1 input ordering the pipeline relies on.
        let mut items = body.data;
        items.sort_by_key(|item| item.index);
        Ok(items.into_iter().map(|item| item.embedding).collect())
    }
}
