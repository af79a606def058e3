//! Configuration consumed by the indexing service.
//!
//! The core never loads configuration on its own behalf; callers hand it a
//! [`ServiceConfig`] built however they like. [`ServiceConfig::from_env`] is a
//! convenience for deployments that configure through the environment, using
//! the variable names the service has historically shipped with.

use serde::{Deserialize, Serialize};

use crate::chunking::DEFAULT_CHUNK_TOKENS;
use crate::embedding::hashed::HashedEmbedder;

/// Which embedding implementation to construct on first use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/embeddings` endpoint reached over HTTP.
    #[default]
    Http,
    /// Deterministic in-process hashed embeddings; no model download, no
    /// network. Useful for offline deployments and hermetic tests.
    Hashed,
}

/// Which vector store implementation to construct on first use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Qdrant reached over its REST API.
    #[default]
    Qdrant,
    /// In-process store; data lives for the lifetime of the process.
    Memory,
}

/// Settings for the embedding provider singleton.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Model identifier sent to the provider; the core treats it as opaque.
    pub model: String,
    /// Base URL of the embedding endpoint. Required for [`EmbeddingBackend::Http`].
    pub endpoint: Option<String>,
    /// Bearer credential, present only for networked deployments.
    pub api_key: Option<String>,
    /// Vector dimension used by [`EmbeddingBackend::Hashed`].
    pub hashed_dim: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model: "BAAI/bge-small-en-v1.5".to_string(),
            endpoint: None,
            api_key: None,
            hashed_dim: HashedEmbedder::DEFAULT_DIM,
        }
    }
}

/// Settings for the vector store singleton.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Base URL of the store's REST endpoint.
    pub url: String,
    /// Access credential, present only for networked deployments. Absent
    /// means credential-less construction.
    pub api_key: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: "http://localhost:6333".to_string(),
            api_key: None,
        }
    }
}

/// Top-level configuration for [`DocIndexService`](crate::service::DocIndexService).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub embedding: EmbeddingConfig,
    pub store: StoreConfig,
    /// Collection used when a request does not name one.
    pub default_collection: Option<String>,
    /// Token budget per chunk.
    pub chunk_tokens: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            store: StoreConfig::default(),
            default_collection: None,
            chunk_tokens: DEFAULT_CHUNK_TOKENS,
        }
    }
}

impl ServiceConfig {
    /// Builds a configuration from the process environment after a
    /// best-effort `.env` load.
    ///
    /// Unset or unparseable variables fall back to defaults rather than
    /// failing, matching how the service has always been deployed:
    ///
    /// | Variable            | Field                        |
    /// |---------------------|------------------------------|
    /// | `EMBEDDING_BACKEND` | `embedding.backend` (`http` / `hashed`) |
    /// | `EMBEDDING_MODEL`   | `embedding.model`            |
    /// | `EMBEDDING_URL`     | `embedding.endpoint`         |
    /// | `EMBEDDING_API_KEY` | `embedding.api_key`          |
    /// | `VECTOR_BACKEND`    | `store.backend` (`qdrant` / `memory`) |
    /// | `QDRANT_URL`        | `store.url`                  |
    /// | `QDRANT_API_KEY`    | `store.api_key`              |
    /// | `COLLECTION_NAME`   | `default_collection`         |
    /// | `CHUNK_SIZE`        | `chunk_tokens`               |
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        if let Some(backend) = env_var("EMBEDDING_BACKEND") {
            if backend.eq_ignore_ascii_case("hashed") {
                config.embedding.backend = EmbeddingBackend::Hashed;
            }
        }
        if let Some(model) = env_var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        config.embedding.endpoint = env_var("EMBEDDING_URL");
        config.embedding.api_key = env_var("EMBEDDING_API_KEY");

        if let Some(backend) = env_var("VECTOR_BACKEND") {
            if backend.eq_ignore_ascii_case("memory") {
                config.store.backend = StoreBackend::Memory;
            }
        }
        if let Some(url) = env_var("QDRANT_URL") {
            config.store.url = url;
        }
        config.store.api_key = env_var("QDRANT_API_KEY");

        config.default_collection = env_var("COLLECTION_NAME");
        if let Some(chunk_tokens) = env_var("CHUNK_SIZE").and_then(|raw| raw.parse().ok()) {
            config.chunk_tokens = chunk_tokens;
        }

        config
    }
}

/// Reads a variable, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_historical_deployment() {
        let config = ServiceConfig::default();
        assert_eq!(config.chunk_tokens, 512);
        assert_eq!(config.store.url, "http://localhost:6333");
        assert_eq!(config.store.backend, StoreBackend::Qdrant);
        assert_eq!(config.embedding.backend, EmbeddingBackend::Http);
        assert!(config.default_collection.is_none());
        assert!(config.store.api_key.is_none());
    }

    #[test]
    fn deserializes_from_partial_document() {
        let config: ServiceConfig = serde_json::from_str(
            r#"{
                "store": {"backend": "memory"},
                "default_collection": "docs",
                "chunk_tokens": 128
            }"#,
        )
        .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.default_collection.as_deref(), Some("docs"));
        assert_eq!(config.chunk_tokens, 128);
        // Untouched sections keep their defaults.
        assert_eq!(config.embedding.backend, EmbeddingBackend::Http);
    }
}
