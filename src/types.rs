//! Domain types flowing between the chunking, embedding, and store layers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded segment of a source document.
///
/// Chunks are derived deterministically from the input text and the configured
/// token budget; `ordinal` records the chunk's position within its document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub ordinal: usize,
}

/// Metadata stored alongside each vector.
///
/// Fields default to empty strings on deserialization so a malformed payload
/// coming back from the store degrades to blanks instead of failing the query
/// that surfaced it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPayload {
    #[serde(default)]
    pub doc_id: String,
    #[serde(default)]
    pub chunk: String,
}

/// One vector plus payload, as written to a collection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

impl StoredPoint {
    /// Builds a point with a fresh v4 id. Ids are never reused, so
    /// re-ingesting a document appends new points rather than replacing
    /// earlier ones.
    pub fn new(vector: Vec<f32>, payload: PointPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            vector,
            payload,
        }
    }
}

/// Similarity metric a collection is created with.
///
/// Serialized with the wire names the Qdrant REST API expects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    Cosine,
    #[serde(rename = "Euclid")]
    Euclidean,
    Dot,
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cosine => write!(f, "Cosine"),
            Self::Euclidean => write!(f, "Euclid"),
            Self::Dot => write!(f, "Dot"),
        }
    }
}

/// A raw hit returned by a [`VectorStore`](crate::store::VectorStore) search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub payload: PointPayload,
    #[serde(default)]
    pub score: f32,
}

/// Caller-facing query result, one per hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub doc_id: String,
    pub chunk: String,
    pub score: f32,
}

impl From<SearchHit> for SearchResult {
    fn from(hit: SearchHit) -> Self {
        Self {
            doc_id: hit.payload.doc_id,
            chunk: hit.payload.chunk,
            score: hit.score,
        }
    }
}
