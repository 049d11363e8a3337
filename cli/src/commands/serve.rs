// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `veritel serve`: wire the classifier, agent clients, workflow engine
//! and dispatcher together and run the chat HTTP API.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use veritel_core::application::dispatcher::IntentDispatcher;
use veritel_core::application::workflows::WorkflowService;
use veritel_core::domain::config::OrchestratorConfig;
use veritel_core::domain::credential::DomainProfile;
use veritel_core::domain::intent::IntentClassifier;
use veritel_core::infrastructure::acapy::connect_network;
use veritel_core::infrastructure::llm::ollama::OllamaClassifier;
use veritel_core::presentation::api;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config =
        OrchestratorConfig::load_or_default(config_path).context("failed to load configuration")?;
    config
        .validate()
        .context("configuration validation failed")?;

    let classifier = Arc::new(OllamaClassifier::new(&config.classifier));
    if let Err(err) = classifier.health_check().await {
        // The orchestrator can start before Ollama; chat requests will
        // fail with a 502 until the backend is up.
        warn!(error = %err, "intent classifier not reachable yet");
    }

    let network = connect_network(&config).context("failed to build agent clients")?;
    let workflows = WorkflowService::new(network, DomainProfile::telecom())?;
    let dispatcher = Arc::new(IntentDispatcher::new(classifier, workflows));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "chat orchestrator listening");

    axum::serve(listener, api::app(dispatcher))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("chat orchestrator stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
