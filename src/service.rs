//! Ingestion and query pipelines.
//!
//! [`DocIndexService`] owns the chunker plus the two lazy singletons and
//! composes them into the caller-facing operations: `ingest`, `query`, and
//! the collection admin pass-throughs. It holds no other state — concurrent
//! requests share the service through an `Arc` with no pipeline-level
//! locking.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::chunking::Chunker;
use crate::config::ServiceConfig;
use crate::embedding::{EmbeddingProvider, LazyEmbedder};
use crate::error::IndexError;
use crate::resolver::resolve_collection;
use crate::store::{LazyStore, VectorStore};
use crate::types::{DistanceMetric, PointPayload, SearchResult, StoredPoint};

/// Document indexing and retrieval pipeline.
pub struct DocIndexService {
    chunker: Chunker,
    embedder: LazyEmbedder,
    store: LazyStore,
    default_collection: Option<String>,
}

impl DocIndexService {
    /// Starts building a service; see [`DocIndexServiceBuilder`].
    pub fn builder() -> DocIndexServiceBuilder {
        DocIndexServiceBuilder::default()
    }

    /// Builds a service straight from configuration, with both singletons on
    /// the lazy path.
    pub fn from_config(config: ServiceConfig) -> Result<Self, IndexError> {
        Self::builder().with_config(config).build()
    }

    /// Chunks, embeds, and persists one document; returns the chunk count.
    ///
    /// A zero return means the text had no content to ingest — that is the
    /// caller's validation failure to report, not an error from this
    /// pipeline. Documents are append-only: re-ingesting a `doc_id` adds new
    /// points alongside the old ones.
    #[tracing::instrument(skip(self, text), fields(doc_id = %doc_id))]
    pub async fn ingest(
        &self,
        doc_id: &str,
        text: &str,
        collection: Option<&str>,
    ) -> Result<usize, IndexError> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            debug!("no chunks produced; nothing to ingest");
            return Ok(0);
        }

        let embedder = self.embedder.get().await?;
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = embedder.embed(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(IndexError::EmbeddingUnavailable(format!(
                "provider '{}' returned {} vectors for {} chunks",
                embedder.model_id(),
                vectors.len(),
                chunks.len()
            )));
        }
        // The provider's dimension is discovered, not configured; the first
        // successful ingest into a fresh collection fixes it at creation.
        let dim = vectors[0].len();

        let target = resolve_collection(collection, self.default_collection.as_deref())?;
        let store = self.store.get().await?;
        ensure_exists(store.as_ref(), &target, dim, DistanceMetric::Cosine).await?;

        let points: Vec<StoredPoint> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                StoredPoint::new(
                    vector,
                    PointPayload {
                        doc_id: doc_id.to_string(),
                        chunk: chunk.text.clone(),
                    },
                )
            })
            .collect();
        store.upsert(&target, points).await?;

        info!(
            collection = %target,
            chunks = chunks.len(),
            dim,
            "ingested document"
        );
        Ok(chunks.len())
    }

    /// Embeds `text` and returns the `top_k` nearest chunks from the resolved
    /// collection, best first.
    #[tracing::instrument(skip(self, text))]
    pub async fn query(
        &self,
        text: &str,
        top_k: usize,
        collection: Option<&str>,
    ) -> Result<Vec<SearchResult>, IndexError> {
        let embedder = self.embedder.get().await?;
        let query = vec![text.to_string()];
        let vectors = embedder.embed(&query).await?;
        let vector = vectors.into_iter().next().ok_or_else(|| {
            IndexError::EmbeddingUnavailable(format!(
                "provider '{}' returned no vector for the query",
                embedder.model_id()
            ))
        })?;

        let target = resolve_collection(collection, self.default_collection.as_deref())?;
        let store = self.store.get().await?;
        let hits = store.search(&target, &vector, top_k).await?;

        debug!(collection = %target, hits = hits.len(), "query complete");
        Ok(hits.into_iter().map(SearchResult::from).collect())
    }

    /// Creates `name` with dimension `dim` if it is missing; a second call is
    /// a no-op success.
    pub async fn ensure_collection(&self, name: &str, dim: usize) -> Result<(), IndexError> {
        let store = self.store.get().await?;
        ensure_exists(store.as_ref(), name, dim, DistanceMetric::Cosine).await
    }

    /// Names of all collections in the store.
    pub async fn list_collections(&self) -> Result<Vec<String>, IndexError> {
        self.store.get().await?.list().await
    }

    /// Drops a collection and everything in it.
    pub async fn delete_collection(&self, name: &str) -> Result<(), IndexError> {
        self.store.get().await?.delete(name).await
    }

    /// Initializes both singletons ahead of the first request, so the first
    /// ingest does not pay the model-load and connection cost.
    pub async fn warm_up(&self) -> Result<(), IndexError> {
        self.embedder.get().await?;
        self.store.get().await?;
        Ok(())
    }
}

/// Shared ensure step for ingest and the admin operation.
///
/// Fail-open policy: an existence check the backend cannot answer is treated
/// as "does not exist" so ingestion still gets to attempt the create — a
/// genuinely dead backend then fails loudly on the create call itself instead
/// of on the probe.
async fn ensure_exists(
    store: &dyn VectorStore,
    name: &str,
    dim: usize,
    metric: DistanceMetric,
) -> Result<(), IndexError> {
    let exists = match store.exists(name).await {
        Ok(exists) => exists,
        Err(err) => {
            warn!(
                collection = %name,
                error = %err,
                "existence check failed; assuming collection is missing"
            );
            false
        }
    };
    if !exists {
        info!(collection = %name, dim, metric = %metric, "creating collection");
        store.create(name, dim, metric).await?;
    }
    Ok(())
}

/// Builder for [`DocIndexService`].
///
/// Configuration drives the lazy construction of both singletons; tests and
/// embedded deployments can instead inject pre-built implementations, which
/// bypass the lazy path entirely.
#[derive(Default)]
pub struct DocIndexServiceBuilder {
    config: Option<ServiceConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
}

impl DocIndexServiceBuilder {
    #[must_use]
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Injects an already-constructed embedding provider.
    #[must_use]
    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(provider);
        self
    }

    /// Injects an already-constructed vector store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<DocIndexService, IndexError> {
        let config = self.config.unwrap_or_default();
        let chunker = Chunker::new(config.chunk_tokens)?;
        let embedder = match self.embedder {
            Some(provider) => LazyEmbedder::preinitialized(provider),
            None => LazyEmbedder::new(config.embedding.clone()),
        };
        let store = match self.store {
            Some(store) => LazyStore::preinitialized(store),
            None => LazyStore::new(config.store.clone()),
        };

        Ok(DocIndexService {
            chunker,
            embedder,
            store,
            default_collection: config.default_collection,
        })
    }
}
