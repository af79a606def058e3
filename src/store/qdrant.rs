//! Qdrant REST adapter.
//!
//! Talks to a Qdrant deployment over its HTTP API with `reqwest`. The adapter
//! stays a thin translation layer: wire errors become
//! [`IndexError::BackendUnavailable`], and the two races the pipeline
//! tolerates — concurrent create, search against a collection that is not
//! there yet — are absorbed here where the status codes are visible.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use super::VectorStore;
use crate::config::StoreConfig;
use crate::error::IndexError;
use crate::types::{DistanceMetric, PointPayload, SearchHit, StoredPoint};

/// [`VectorStore`] backed by Qdrant's REST API.
///
/// Construction degrades gracefully to credential-less operation when no API
/// key is configured; with one, every request carries the `api-key` header.
pub struct QdrantStore {
    client: Client,
    base: String,
    api_key: Option<String>,
}

impl QdrantStore {
    pub fn new(config: &StoreConfig) -> Result<Self, IndexError> {
        let base = config.url.trim_end_matches('/').to_string();
        Url::parse(&base).map_err(|err| {
            IndexError::InvalidConfig(format!("invalid vector store url '{}': {err}", config.url))
        })?;
        let client = Client::builder()
            .build()
            .map_err(|err| IndexError::BackendUnavailable(err.to_string()))?;

        Ok(Self {
            client,
            base,
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, format!("{}{path}", self.base));
        if let Some(api_key) = &self.api_key {
            request = request.header("api-key", api_key);
        }
        request
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<Response, IndexError> {
        request.send().await.map_err(|err| {
            IndexError::BackendUnavailable(format!("{context}: {err}"))
        })
    }
}

async fn expect_success(response: Response, context: &str) -> Result<Response, IndexError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(IndexError::BackendUnavailable(format!(
        "{context} returned {status}: {body}"
    )))
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    result: T,
}

#[derive(Deserialize)]
struct ExistsResult {
    exists: bool,
}

#[derive(Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Serialize)]
struct VectorParams {
    size: usize,
    distance: DistanceMetric,
}

#[derive(Deserialize)]
struct ScoredPoint {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

impl From<ScoredPoint> for SearchHit {
    fn from(point: ScoredPoint) -> Self {
        // Missing or malformed payloads degrade to empty fields instead of
        // failing the query that surfaced them.
        let payload = point
            .payload
            .map(|value| serde_json::from_value::<PointPayload>(value).unwrap_or_default())
            .unwrap_or_default();
        SearchHit {
            payload,
            score: point.score,
        }
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn exists(&self, name: &str) -> Result<bool, IndexError> {
        let request = self.request(Method::GET, &format!("/collections/{name}/exists"));
        let response = self.send(request, "existence check").await?;
        let response = expect_success(response, "existence check").await?;
        let body: ApiResponse<ExistsResult> = response
            .json()
            .await
            .map_err(|err| IndexError::BackendUnavailable(err.to_string()))?;
        Ok(body.result.exists)
    }

    async fn create(
        &self,
        name: &str,
        dim: usize,
        metric: DistanceMetric,
    ) -> Result<(), IndexError> {
        let request = self
            .request(Method::PUT, &format!("/collections/{name}"))
            .json(&json!({ "vectors": VectorParams { size: dim, distance: metric } }));
        let response = self.send(request, "collection create").await?;
        // Another caller won the create race; the collection is there, which
        // is all this operation promises.
        if response.status() == StatusCode::CONFLICT {
            return Ok(());
        }
        expect_success(response, "collection create").await?;
        Ok(())
    }

    async fn upsert(&self, name: &str, points: Vec<StoredPoint>) -> Result<(), IndexError> {
        let request = self
            .request(Method::PUT, &format!("/collections/{name}/points"))
            .query(&[("wait", "true")])
            .json(&json!({ "points": points }));
        let response = self.send(request, "point upsert").await?;
        expect_success(response, "point upsert").await?;
        Ok(())
    }

    async fn search(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>, IndexError> {
        let request = self
            .request(Method::POST, &format!("/collections/{name}/points/search"))
            .json(&json!({
                "vector": vector,
                "limit": top_k,
                "with_payload": true,
            }));
        let response = self.send(request, "search").await?;
        // A resolvable name whose collection was never created behaves like
        // an empty collection.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let response = expect_success(response, "search").await?;
        let body: ApiResponse<Vec<ScoredPoint>> = response
            .json()
            .await
            .map_err(|err| IndexError::BackendUnavailable(err.to_string()))?;
        Ok(body.result.into_iter().map(SearchHit::from).collect())
    }

    async fn list(&self) -> Result<Vec<String>, IndexError> {
        let request = self.request(Method::GET, "/collections");
        let response = self.send(request, "collection list").await?;
        let response = expect_success(response, "collection list").await?;
        let body: ApiResponse<CollectionsResult> = response
            .json()
            .await
            .map_err(|err| IndexError::BackendUnavailable(err.to_string()))?;
        Ok(body
            .result
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }

    async fn delete(&self, name: &str) -> Result<(), IndexError> {
        let request = self.request(Method::DELETE, &format!("/collections/{name}"));
        let response = self.send(request, "collection delete").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        expect_success(response, "collection delete").await?;
        Ok(())
    }
}
