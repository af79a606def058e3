//! # Docsmith: document chunking, embedding, and vector retrieval
//!
//! Docsmith turns raw text into searchable vectors: it splits documents into
//! token-bounded chunks, embeds each chunk into a fixed-dimension vector,
//! persists chunk vectors and metadata into a named collection of an external
//! vector index, and answers nearest-neighbor similarity queries against that
//! collection.
//!
//! ```text
//! Document text ──► chunking::Chunker ──────────► [Chunk]
//!                                                    │
//!                   embedding::EmbeddingProvider ◄───┘
//!                     (lazy singleton)  │
//!                                       ▼
//!                   resolver::resolve_collection ──► target name
//!                                       │
//!                   store::VectorStore ◄┘
//!                     (lazy singleton)  │
//!                                       ├─► ingest: create-if-missing + upsert
//!                                       └─► query:  nearest-neighbor search
//! ```
//!
//! ## Core pieces
//!
//! - [`chunking::Chunker`] — deterministic, token-measured recursive splitter.
//! - [`embedding::EmbeddingProvider`] — trait over embedding backends, with an
//!   OpenAI-compatible HTTP implementation and a deterministic offline one.
//! - [`store::VectorStore`] — trait over vector indexes, with a Qdrant REST
//!   adapter and an in-process backend.
//! - [`service::DocIndexService`] — the ingestion and query pipelines that
//!   compose the above, plus collection admin pass-throughs.
//!
//! Both the embedding provider and the store client are constructed lazily,
//! exactly once per process, behind `tokio` once-cells; concurrent first
//! callers coalesce onto a single initialization and steady-state calls hold
//! no process-wide lock.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use docsmith::config::ServiceConfig;
//! use docsmith::service::DocIndexService;
//!
//! # async fn run() -> Result<(), docsmith::error::IndexError> {
//! let service = DocIndexService::from_config(ServiceConfig::from_env())?;
//!
//! let chunks = service
//!     .ingest("guide-1", "Long document text…", Some("manuals"))
//!     .await?;
//! assert!(chunks > 0);
//!
//! let hits = service.query("how do I install it?", 5, Some("manuals")).await?;
//! for hit in hits {
//!     println!("{} ({:.3}): {}", hit.doc_id, hit.score, hit.chunk);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chunking;
pub mod config;
pub mod embedding;
pub mod error;
pub mod resolver;
pub mod service;
pub mod store;
pub mod types;

pub use config::ServiceConfig;
pub use error::IndexError;
pub use service::{DocIndexService, DocIndexServiceBuilder};
pub use types::{Chunk, DistanceMetric, SearchResult};
