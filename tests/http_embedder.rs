//! Wire-level tests for the OpenAI-compatible embedding provider.

use httpmock::prelude::*;
use serde_json::json;

use docsmith::config::EmbeddingConfig;
use docsmith::embedding::{EmbeddingProvider, HttpEmbedder};
use docsmith::error::IndexError;

fn embedder_for(server: &MockServer, api_key: Option<&str>) -> HttpEmbedder {
    HttpEmbedder::new(&EmbeddingConfig {
        model: "test-model".into(),
        endpoint: Some(server.base_url()),
        api_key: api_key.map(str::to_string),
        ..EmbeddingConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn embeds_a_batch_and_restores_input_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/embeddings")
                .json_body(json!({"model": "test-model", "input": ["first", "second"]}));
            then.status(200).json_body(json!({
                "object": "list",
                "model": "test-model",
                "data": [
                    {"object": "embedding", "index": 1, "embedding": [0.4, 0.5, 0.6]},
                    {"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]}
                ]
            }));
        })
        .await;

    let embedder = embedder_for(&server, None);
    let vectors = embedder
        .embed(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0], vec![0.1, 0.2, 0.3]);
    assert_eq!(vectors[1], vec![0.4, 0.5, 0.6]);
    mock.assert_async().await;
}

#[tokio::test]
async fn sends_a_bearer_credential_when_configured() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/embeddings")
                .header("authorization", "Bearer secret-key");
            then.status(200).json_body(json!({
                "data": [{"index": 0, "embedding": [1.0]}]
            }));
        })
        .await;

    let embedder = embedder_for(&server, Some("secret-key"));
    embedder.embed(&["text".to_string()]).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn error_statuses_surface_as_embedding_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(503).body("model is loading");
        })
        .await;

    let embedder = embedder_for(&server, None);
    let err = embedder.embed(&["text".to_string()]).await.unwrap_err();
    assert!(matches!(err, IndexError::EmbeddingUnavailable(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn a_short_batch_is_rejected_instead_of_misaligned() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(200).json_body(json!({
                "data": [{"index": 0, "embedding": [1.0]}]
            }));
        })
        .await;

    let embedder = embedder_for(&server, None);
    let err = embedder
        .embed(&["one".to_string(), "two".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::EmbeddingUnavailable(_)));
}

#[tokio::test]
async fn missing_endpoint_is_an_invalid_config() {
    let result = HttpEmbedder::new(&EmbeddingConfig {
        endpoint: None,
        ..EmbeddingConfig::default()
    });
    assert!(matches!(result, Err(IndexError::InvalidConfig(_))));
}
