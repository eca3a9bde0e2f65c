//! The webhook listener.
//!
//! `POST /webhook` takes the forge push payload, runs the sync pipeline
//! under the repository's lock, and answers with the terminal outcome.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use relay_core::{Config, PushEvent};
use relay_policy::{LanguageModel, OpenAiChat, PolicyClassifier};
use relay_sync::{sync_repository, GitCli, SyncError};

use crate::error::DaemonError;
use crate::locks::RepoLocks;

/// Shared service state: configuration plus the pipeline capabilities.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<StateInner>,
}

struct StateInner {
    config: Config,
    git: GitCli,
    classifier: PolicyClassifier,
    locks: RepoLocks,
}

impl AppState {
    /// Build the service state. The remote classification stage is enabled
    /// only when an OpenAI credential is configured.
    pub fn new(config: Config) -> Self {
        let model: Option<Box<dyn LanguageModel>> = match &config.openai_api_key {
            Some(key) => Some(Box::new(OpenAiChat::new(key.clone()))),
            None => {
                tracing::warn!(
                    "OPENAI_API_KEY not provided, Indonesian comment detection limited to the heuristic stage"
                );
                None
            }
        };

        Self {
            inner: Arc::new(StateInner {
                config,
                git: GitCli::new(),
                classifier: PolicyClassifier::new(model),
                locks: RepoLocks::new(),
            }),
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(handle_push))
        .with_state(state)
}

/// Bind `addr` and serve webhooks until the process is stopped.
pub async fn run(addr: SocketAddr, state: AppState) -> Result<(), DaemonError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| DaemonError::Bind { addr, source })?;
    tracing::info!(addr = %addr, "relay webhook listener started");
    axum::serve(listener, router(state))
        .await
        .map_err(DaemonError::Serve)
}

async fn handle_push(State(state): State<AppState>, Json(event): Json<PushEvent>) -> Response {
    let name = match event.repo() {
        Ok((name, _)) => name.to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "rejecting malformed webhook payload");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    // One pipeline run at a time per repository; the mirror on disk is shared
    // state across events.
    let lock = state.inner.locks.for_repo(&name).await;
    let _guard = lock.lock().await;

    let result = sync_repository(
        &state.inner.config,
        &state.inner.git,
        &state.inner.classifier,
        &event,
    )
    .await;

    match result {
        Ok(outcome) => {
            tracing::info!(repo = %name, outcome = ?outcome, "pipeline finished");
            (
                StatusCode::OK,
                Json(json!({ "repository": name, "result": outcome })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(repo = %name, error = %err, "pipeline failed");
            error_response(status_for(&err), &err.to_string())
        }
    }
}

fn status_for(err: &SyncError) -> StatusCode {
    match err {
        SyncError::Payload(_) => StatusCode::BAD_REQUEST,
        SyncError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        SyncError::Clone(_) | SyncError::Remote(_) | SyncError::Fetch(_) => StatusCode::BAD_GATEWAY,
        SyncError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
