// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Chat HTTP API
//!
//! One inbound endpoint: `POST /chat` takes `{message}` and answers
//! `{response}`. Workflow-level business failures are 200 with a
//! descriptive string — the chat surface never shows raw HTTP errors —
//! and only classifier/dispatch faults produce a non-2xx status.

use crate::application::dispatcher::IntentDispatcher;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

pub struct AppState {
    pub dispatcher: Arc<IntentDispatcher>,
}

pub fn app(dispatcher: Arc<IntentDispatcher>) -> Router {
    let state = Arc::new(AppState { dispatcher });

    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> impl IntoResponse {
    match state.dispatcher.handle_message(&payload.message).await {
        Ok(response) => (StatusCode::OK, Json(json!({ "response": response }))),
        Err(err) => {
            error!(error = %err, "dispatch failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": err.to_string() })),
            )
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
