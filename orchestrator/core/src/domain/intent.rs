// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Intent Classifier Domain Interface (Anti-Corruption Layer)
//!
//! Abstracts the natural-language classifier behind a trait so the
//! dispatcher and its tests never touch a concrete LLM API.
//! Implementation in `infrastructure/llm/`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the sentinel intent a model may emit when it cannot classify.
/// The dispatcher treats it like an unknown intent: no agent call happens.
pub const ERROR_INTENT: &str = "error";

/// A classified user utterance: an intent name plus string parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentCall {
    #[serde(rename = "function_name")]
    pub name: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// Errors from the classifier itself (not from workflows it routes to).
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier unreachable: {0}")]
    Network(String),

    #[error("classifier returned malformed output: {0}")]
    Malformed(String),

    #[error("classifier backend error: {0}")]
    Provider(String),
}

/// Domain interface for intent classification.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify a free-text message into an intent call.
    async fn classify(&self, utterance: &str) -> Result<IntentCall, ClassifierError>;

    /// Check the classifier backend is reachable.
    async fn health_check(&self) -> Result<(), ClassifierError>;
}
