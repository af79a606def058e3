//! Embedding providers and their lazy, process-lifetime lifecycle.
//!
//! The pipeline talks to embeddings through the [`EmbeddingProvider`] trait;
//! which implementation backs it is decided once, at construction, from
//! [`EmbeddingConfig`]. Vector dimensionality is discovered from the first
//! embedding output rather than configured.

pub mod hashed;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::IndexError;

pub use hashed::HashedEmbedder;
pub use http::HttpEmbedder;

/// Maps text to fixed-dimension float vectors.
///
/// Implementations must preserve input order and count 1:1, and every vector
/// produced by one provider instance must share the same dimension.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the underlying model, for logging and diagnostics.
    fn model_id(&self) -> &str;

    /// Embeds a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexError>;
}

/// Lazily-initialized handle to the process-wide embedding provider.
///
/// The first caller of [`LazyEmbedder::get`] constructs the provider from the
/// stored configuration; concurrent first callers coalesce onto that one
/// initialization and nobody re-initializes afterwards. The cell only guards
/// construction — steady-state `embed` calls run without any process-wide
/// lock. A failed construction is not cached, so a later call retries.
#[derive(Clone)]
pub struct LazyEmbedder {
    config: EmbeddingConfig,
    cell: Arc<OnceCell<Arc<dyn EmbeddingProvider>>>,
}

impl LazyEmbedder {
    /// Defers construction until first use.
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            config,
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Wraps an already-constructed provider; the lazy path never runs.
    pub fn preinitialized(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            config: EmbeddingConfig::default(),
            cell: Arc::new(OnceCell::new_with(Some(provider))),
        }
    }

    /// Returns the provider, constructing it on first use.
    pub async fn get(&self) -> Result<Arc<dyn EmbeddingProvider>, IndexError> {
        self.cell
            .get_or_try_init(|| async { build_provider(&self.config) })
            .await
            .cloned()
    }
}

fn build_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, IndexError> {
    match config.backend {
        EmbeddingBackend::Http => Ok(Arc::new(HttpEmbedder::new(config)?)),
        EmbeddingBackend::Hashed => Ok(Arc::new(HashedEmbedder::new(
            config.model.clone(),
            config.hashed_dim,
        ))),
    }
}
