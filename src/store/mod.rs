//! Vector store backends and their lazy, process-lifetime lifecycle.
//!
//! The pipelines talk to vector storage through the [`VectorStore`] trait.
//! Which implementation backs it is decided once, at construction, from
//! [`StoreConfig`] — never by conditionals scattered through the pipeline.
//!
//! ```text
//!                  ┌───────────────────┐
//!                  │ VectorStore trait │
//!                  │  (async, batch)   │
//!                  └─────────┬─────────┘
//!                            │
//!               ┌────────────┴────────────┐
//!               ▼                         ▼
//!       ┌──────────────┐          ┌──────────────┐
//!       │ QdrantStore  │          │ MemoryStore  │
//!       │  REST + key  │          │  in-process  │
//!       └──────────────┘          └──────────────┘
//! ```

pub mod memory;
pub mod qdrant;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::IndexError;
use crate::types::{DistanceMetric, SearchHit, StoredPoint};

pub use memory::MemoryStore;
pub use qdrant::QdrantStore;

/// Capability surface of an external vector index.
///
/// All operations are idempotent unless noted. Serialization of concurrent
/// writes to one collection is the backend's responsibility; callers add no
/// locking of their own.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Reports whether a collection named `name` exists.
    ///
    /// Transport failures surface as errors here; whether to treat an
    /// unanswerable check as "does not exist" is the caller's policy, not the
    /// adapter's.
    async fn exists(&self, name: &str) -> Result<bool, IndexError>;

    /// Creates a collection with the given dimension and metric.
    ///
    /// Succeeds when another caller created the collection first; the
    /// concurrent-create race is tolerated, not surfaced.
    async fn create(&self, name: &str, dim: usize, metric: DistanceMetric)
    -> Result<(), IndexError>;

    /// Batch write. Not transactional: a mid-batch failure may leave a subset
    /// of points persisted, and no retry or rollback is attempted here.
    async fn upsert(&self, name: &str, points: Vec<StoredPoint>) -> Result<(), IndexError>;

    /// Nearest neighbors under the collection's metric, best first, at most
    /// `top_k`. Unknown or empty collections yield an empty list rather than
    /// an error.
    async fn search(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>, IndexError>;

    /// Names of all collections.
    async fn list(&self) -> Result<Vec<String>, IndexError>;

    /// Drops a collection. Deleting a collection that does not exist is a
    /// no-op success.
    async fn delete(&self, name: &str) -> Result<(), IndexError>;
}

/// Lazily-initialized handle to the process-wide vector store client.
///
/// Lifecycle is identical in shape to
/// [`LazyEmbedder`](crate::embedding::LazyEmbedder): the first caller
/// constructs the client, concurrent first callers coalesce, the cell never
/// re-initializes, and steady-state calls hold no process-wide lock.
#[derive(Clone)]
pub struct LazyStore {
    config: StoreConfig,
    cell: Arc<OnceCell<Arc<dyn VectorStore>>>,
}

impl LazyStore {
    /// Defers construction until first use.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Wraps an already-constructed store; the lazy path never runs.
    pub fn preinitialized(store: Arc<dyn VectorStore>) -> Self {
        Self {
            config: StoreConfig::default(),
            cell: Arc::new(OnceCell::new_with(Some(store))),
        }
    }

    /// Returns the store, constructing it on first use.
    pub async fn get(&self) -> Result<Arc<dyn VectorStore>, IndexError> {
        self.cell
            .get_or_try_init(|| async { build_store(&self.config) })
            .await
            .cloned()
    }
}

fn build_store(config: &StoreConfig) -> Result<Arc<dyn VectorStore>, IndexError> {
    match config.backend {
        StoreBackend::Qdrant => Ok(Arc::new(QdrantStore::new(config)?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lazy_initialization_happens_once_and_is_shared() {
        let lazy = LazyStore::new(StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        });
        let first = lazy.get().await.unwrap();
        let second = lazy.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn invalid_url_is_rejected_at_construction() {
        let result = build_store(&StoreConfig {
            backend: StoreBackend::Qdrant,
            url: "not a url".into(),
            api_key: None,
        });
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));
    }
}
