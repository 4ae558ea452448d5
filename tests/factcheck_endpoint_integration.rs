use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use factpad::error::ModelError;
use factpad::fact_source::{FactSourceChain, FactSourceModel, KnowledgeBase, ModelBackend};
use factpad::protocol::FactCheckResponse;
use factpad::server;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::TestServer;

struct NeverReplies;

#[async_trait]
impl ModelBackend for NeverReplies {
    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        std::future::pending::<()>().await;
        Err(ModelError::EmptyResponse)
    }
}

struct Canned(&'static str);

#[async_trait]
impl ModelBackend for Canned {
    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        Ok(self.0.to_string())
    }
}

async fn post_factcheck(chain: FactSourceChain, body: &str) -> (StatusCode, FactCheckResponse) {
    let response = server::router(chain)
        .oneshot(
            Request::post("/factcheck")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_hung_model_answers_empty_within_timeout() {
    let model = FactSourceModel::new(Arc::new(NeverReplies));
    let chain = FactSourceChain::new().with_source(Arc::new(model));

    let started = tokio::time::Instant::now();
    let (status, body) = post_factcheck(chain, r#"{"sentence":"Cats have nine lives."}"#).await;
    let elapsed = started.elapsed();

    assert_eq!(status, StatusCode::OK);
    assert!(body.corrections.is_empty());
    assert!(elapsed >= Duration::from_millis(5000));
    assert!(elapsed < Duration::from_millis(5500), "took {elapsed:?}");
}

#[tokio::test]
async fn test_knowledge_base_wins_before_model() {
    let chain = FactSourceChain::new()
        .with_source(Arc::new(KnowledgeBase::builtin()))
        .with_source(Arc::new(FactSourceModel::new(Arc::new(Canned(
            r#"{"suggestion":"model","explanation":"should not be asked"}"#,
        )))));

    let (_, body) = post_factcheck(chain, r#"{"sentence":"Water boils at 0 degrees."}"#).await;
    assert_eq!(body.corrections.len(), 1);
    assert!(body.corrections[0].suggestion.contains("100°C"));
}

#[tokio::test]
async fn test_model_fallback_with_fenced_reply() {
    let chain = FactSourceChain::new()
        .with_source(Arc::new(KnowledgeBase::builtin()))
        .with_source(Arc::new(FactSourceModel::new(Arc::new(Canned(
            "```json\n{\"suggestion\":\"Bats are not blind.\",\"explanation\":\"They see fine.\"}\n```",
        )))));

    let (_, body) = post_factcheck(chain, r#"{"sentence":"Bats are blind."}"#).await;
    assert_eq!(body.corrections.len(), 1);
    assert_eq!(body.corrections[0].suggestion, "Bats are not blind.");
    assert_eq!(body.corrections[0].explanation, "They see fine.");
}

#[tokio::test]
async fn test_malformed_model_reply_is_empty() {
    let chain = FactSourceChain::new().with_source(Arc::new(FactSourceModel::new(Arc::new(Canned(
        "I think that sentence is probably fine?",
    )))));

    let (status, body) = post_factcheck(chain, r#"{"sentence":"Something."}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.corrections.is_empty());
}

#[tokio::test]
async fn test_real_server_over_http() {
    let server = TestServer::with_knowledge_base().await;
    let client = reqwest::Client::new();

    let body: FactCheckResponse = client
        .post(format!("{}/factcheck", server.base_url()))
        .json(&serde_json::json!({"sentence": "Water freezes at 100 degrees."}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.corrections.len(), 1);

    let status = client
        .post(format!("{}/factcheck", server.base_url()))
        .body("{")
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::OK);
}
