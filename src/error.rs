//! Error types shared across the indexing and retrieval pipelines.

use thiserror::Error;

/// Failures surfaced by the document indexing core.
///
/// Variants fall into two classes. Validation-class errors describe a problem
/// with the caller's input and should map to a client-visible rejection at the
/// boundary layer. Infrastructure-class errors describe a collaborator that
/// could not be reached or misbehaved, and should map to a server-side
/// failure. [`IndexError::is_client_error`] encodes the split so the boundary
/// layer never has to match on individual variants.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Neither the request nor the configuration named a target collection.
    #[error("no target collection: pass one on the request or configure a default")]
    NoTargetCollection,

    /// The configuration handed to a constructor was unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The chunking tokenizer could not be initialized.
    #[error("chunking unavailable: {0}")]
    Chunking(String),

    /// The embedding provider failed to initialize or failed on a call.
    #[error("embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The vector store backend failed to initialize or failed on a call.
    #[error("vector store unavailable: {0}")]
    BackendUnavailable(String),
}

impl IndexError {
    /// Returns `true` for errors caused by the caller's input rather than by
    /// an unavailable collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NoTargetCollection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_and_server_classes_are_distinguishable() {
        assert!(IndexError::NoTargetCollection.is_client_error());
        assert!(!IndexError::EmbeddingUnavailable("model load failed".into()).is_client_error());
        assert!(!IndexError::BackendUnavailable("connection refused".into()).is_client_error());
    }
}
