//! In-process vector store backend.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::VectorStore;
use crate::error::IndexError;
use crate::types::{DistanceMetric, SearchHit, StoredPoint};

struct Collection {
    dim: usize,
    metric: DistanceMetric,
    points: Vec<StoredPoint>,
}

/// In-memory [`VectorStore`] used for tests and single-process deployments.
///
/// Selected via [`StoreBackend::Memory`](crate::config::StoreBackend); shares
/// the full trait surface with the networked adapter so the pipelines stay
/// backend-agnostic. Data lives for the lifetime of the process.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimension a collection was created with, if it exists. Test hook for
    /// the dimension-consistency invariant.
    pub fn collection_dim(&self, name: &str) -> Option<usize> {
        self.collections
            .read()
            .get(name)
            .map(|collection| collection.dim)
    }
}

fn score(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        DistanceMetric::Cosine => {
            let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
            let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm_a == 0.0 || norm_b == 0.0 {
                0.0
            } else {
                dot / (norm_a * norm_b)
            }
        }
        DistanceMetric::Dot => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        // Negated distance keeps "higher is better" uniform across metrics.
        DistanceMetric::Euclidean => {
            -a.iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt()
        }
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn exists(&self, name: &str) -> Result<bool, IndexError> {
        Ok(self.collections.read().contains_key(name))
    }

    async fn create(
        &self,
        name: &str,
        dim: usize,
        metric: DistanceMetric,
    ) -> Result<(), IndexError> {
        let mut collections = self.collections.write();
        // A concurrent caller may have created it first; keep the original.
        collections.entry(name.to_string()).or_insert(Collection {
            dim,
            metric,
            points: Vec::new(),
        });
        Ok(())
    }

    async fn upsert(&self, name: &str, points: Vec<StoredPoint>) -> Result<(), IndexError> {
        let mut collections = self.collections.write();
        let collection = collections.get_mut(name).ok_or_else(|| {
            IndexError::BackendUnavailable(format!("collection '{name}' does not exist"))
        })?;

        if let Some(point) = points
            .iter()
            .find(|point| point.vector.len() != collection.dim)
        {
            return Err(IndexError::BackendUnavailable(format!(
                "dimension mismatch for collection '{name}': expected {}, got {}",
                collection.dim,
                point.vector.len()
            )));
        }

        collection.points.extend(points);
        Ok(())
    }

    async fn search(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>, IndexError> {
        let collections = self.collections.read();
        let Some(collection) = collections.get(name) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<SearchHit> = collection
            .points
            .iter()
            .map(|point| SearchHit {
                payload: point.payload.clone(),
                score: score(collection.metric, vector, &point.vector),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn list(&self) -> Result<Vec<String>, IndexError> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<(), IndexError> {
        self.collections.write().remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointPayload;

    fn point(doc_id: &str, chunk: &str, vector: Vec<f32>) -> StoredPoint {
        StoredPoint::new(
            vector,
            PointPayload {
                doc_id: doc_id.into(),
                chunk: chunk.into(),
            },
        )
    }

    #[tokio::test]
    async fn create_is_idempotent_and_keeps_the_original_dim() {
        let store = MemoryStore::new();
        store.create("c", 4, DistanceMetric::Cosine).await.unwrap();
        store.create("c", 8, DistanceMetric::Dot).await.unwrap();
        assert_eq!(store.collection_dim("c"), Some(4));
        assert_eq!(store.list().await.unwrap(), vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn upsert_rejects_mismatched_dimensions() {
        let store = MemoryStore::new();
        store.create("c", 3, DistanceMetric::Cosine).await.unwrap();
        let err = store
            .upsert("c", vec![point("d", "text", vec![1.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn upsert_into_unknown_collection_fails() {
        let store = MemoryStore::new();
        let err = store
            .upsert("missing", vec![point("d", "text", vec![1.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn search_orders_by_descending_similarity() {
        let store = MemoryStore::new();
        store.create("c", 2, DistanceMetric::Cosine).await.unwrap();
        store
            .upsert(
                "c",
                vec![
                    point("far", "far", vec![0.0, 1.0]),
                    point("near", "near", vec![1.0, 0.05]),
                ],
            )
            .await
            .unwrap();

        let hits = store.search("c", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].payload.doc_id, "near");
        assert!(hits[0].score > hits[1].score);

        let capped = store.search("c", &[1.0, 0.0], 1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn search_on_missing_or_empty_collection_is_empty_not_an_error() {
        let store = MemoryStore::new();
        assert!(store.search("missing", &[1.0], 5).await.unwrap().is_empty());
        store.create("c", 1, DistanceMetric::Cosine).await.unwrap();
        assert!(store.search("c", &[1.0], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn euclidean_scores_rank_closer_points_higher() {
        let store = MemoryStore::new();
        store
            .create("c", 1, DistanceMetric::Euclidean)
            .await
            .unwrap();
        store
            .upsert(
                "c",
                vec![point("a", "a", vec![1.0]), point("b", "b", vec![5.0])],
            )
            .await
            .unwrap();
        let hits = store.search("c", &[0.0], 10).await.unwrap();
        assert_eq!(hits[0].payload.doc_id, "a");
    }

    #[tokio::test]
    async fn delete_removes_and_tolerates_missing() {
        let store = MemoryStore::new();
        store.create("c", 1, DistanceMetric::Cosine).await.unwrap();
        store.delete("c").await.unwrap();
        assert!(!store.exists("c").await.unwrap());
        store.delete("c").await.unwrap();
    }
}
