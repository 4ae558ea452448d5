// WHY: HTTP surface of the verification service
// The fact-check routes answer 200 with a corrections array no matter what fails upstream.

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::future::join_all;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::fact_source::FactSourceChain;
use crate::protocol::{
    BatchCheckRequest, BatchCheckResponse, BatchCheckResult, FactCheckRequest, FactCheckResponse,
};

/// Shared, read-only server state
#[derive(Clone)]
pub struct AppState {
    chain: Arc<FactSourceChain>,
}

impl AppState {
    pub fn new(chain: FactSourceChain) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }
}

pub fn router(chain: FactSourceChain) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/factcheck", post(factcheck))
        .route("/factcheck/batch", post(factcheck_batch))
        .with_state(AppState::new(chain))
}

/// Serve until ctrl-c
pub async fn serve(listener: TcpListener, chain: FactSourceChain) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(sources = ?chain.source_names(), "Fact-check server listening on http://{}", addr);

    axum::serve(listener, router(chain))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Fact-check server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn check_one(chain: &FactSourceChain, sentence: &str) -> Vec<crate::corrections::Correction> {
    let sentence = sentence.trim();
    if sentence.is_empty() {
        return Vec::new();
    }
    chain.check(sentence).await.into_corrections()
}

async fn factcheck(
    State(state): State<AppState>,
    payload: Result<Json<FactCheckRequest>, JsonRejection>,
) -> Json<FactCheckResponse> {
    let sentence = match payload {
        Ok(Json(request)) => request.sentence.unwrap_or_default(),
        Err(rejection) => {
            warn!("Unreadable fact-check request: {}", rejection);
            return Json(FactCheckResponse::default());
        }
    };

    let corrections = check_one(&state.chain, &sentence).await;
    debug!(corrections = corrections.len(), "Fact-check answered");
    Json(FactCheckResponse { corrections })
}

async fn factcheck_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchCheckRequest>, JsonRejection>,
) -> Json<BatchCheckResponse> {
    let sentences = match payload {
        Ok(Json(request)) => request.sentences,
        Err(rejection) => {
            warn!("Unreadable batch request: {}", rejection);
            return Json(BatchCheckResponse::default());
        }
    };

    let sentences: Vec<String> = sentences
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let checks = sentences.iter().map(|s| check_one(&state.chain, s));
    let results = join_all(checks)
        .await
        .into_iter()
        .zip(sentences.iter())
        .map(|(corrections, sentence)| BatchCheckResult {
            sentence: sentence.clone(),
            corrections,
        })
        .collect();

    Json(BatchCheckResponse { results })
}
