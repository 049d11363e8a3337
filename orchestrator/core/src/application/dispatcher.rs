// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Intent Dispatcher
//!
//! Routes a classified intent to the matching workflow and renders the
//! outcome (or failure) as the chat response string. Pure routing: no
//! business logic lives here, so workflows stay independently testable.
//!
//! The workflow context sits behind a mutex held for a workflow's whole
//! duration, which serializes workflows and keeps the one-run-at-a-time
//! invariant the context relies on.

use crate::application::workflows::{WorkflowError, WorkflowService};
use crate::domain::context::WorkflowContext;
use crate::domain::intent::{ClassifierError, IntentCall, IntentClassifier, ERROR_INTENT};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The intent names the classifier is prompted to emit.
pub const INTENT_SETUP: &str = "setup_telco";
pub const INTENT_CONNECT: &str = "conectar_cliente";
pub const INTENT_ISSUE: &str = "ativar_plano";
pub const INTENT_VERIFY: &str = "verificar_acesso";

/// Infrastructure-level dispatch failures. Business failures never land
/// here; they become response strings.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("intent classification failed: {0}")]
    Classifier(#[from] ClassifierError),
}

pub struct IntentDispatcher {
    classifier: Arc<dyn IntentClassifier>,
    workflows: WorkflowService,
    context: Mutex<WorkflowContext>,
}

impl IntentDispatcher {
    pub fn new(classifier: Arc<dyn IntentClassifier>, workflows: WorkflowService) -> Self {
        Self {
            classifier,
            workflows,
            context: Mutex::new(WorkflowContext::new()),
        }
    }

    /// Classify a free-text message and run the matching workflow.
    pub async fn handle_message(&self, message: &str) -> Result<String, DispatchError> {
        let intent = self.classifier.classify(message).await?;
        info!(intent = %intent.name, "classified message");
        Ok(self.dispatch(intent).await)
    }

    /// Route an already-classified intent. Unknown intents (including the
    /// classifier's `error` sentinel) answer without any agent call.
    pub async fn dispatch(&self, intent: IntentCall) -> String {
        if intent.name == ERROR_INTENT {
            let detail = intent
                .parameters
                .get("message")
                .map(String::as_str)
                .unwrap_or("no detail");
            warn!(%detail, "classifier emitted error sentinel");
            return format!("Sorry, I could not understand that request ({detail}).");
        }

        let result = match intent.name.as_str() {
            INTENT_SETUP => {
                let mut ctx = self.context.lock().await;
                self.workflows.setup(&mut ctx).await
            }
            INTENT_CONNECT => {
                let mut ctx = self.context.lock().await;
                self.workflows.connect(&mut ctx).await
            }
            INTENT_ISSUE => {
                let mut ctx = self.context.lock().await;
                self.workflows.issue(&mut ctx, &intent.parameters).await
            }
            INTENT_VERIFY => {
                let mut ctx = self.context.lock().await;
                self.workflows.verify(&mut ctx).await
            }
            unknown => {
                warn!(intent = %unknown, "unknown intent");
                return format!("I don't know how to handle the request '{unknown}'.");
            }
        };

        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(intent = %intent.name, error = %err, "workflow failed");
                Self::failure_message(&err)
            }
        }
    }

    /// Map a typed workflow failure to a user-facing response. Every
    /// variant stays distinguishable; a timeout is never worded as a
    /// denial.
    fn failure_message(err: &WorkflowError) -> String {
        match err {
            WorkflowError::MissingDid => {
                "The issuer agent has no public DID; provision its wallet before running setup."
                    .into()
            }
            WorkflowError::Precondition(reason) => {
                format!("That step is not possible yet: {reason}.")
            }
            WorkflowError::Timeout { step } => {
                format!("Timed out waiting for {step}; please try again later.")
            }
            WorkflowError::UnreadableProof { missing } => format!(
                "The presentation verified, but the revealed attribute '{missing}' could not \
                 be read."
            ),
            WorkflowError::SchemaCreation { .. }
            | WorkflowError::CredDefCreation { .. }
            | WorkflowError::Agent(_) => format!("The operation failed: {err}."),
        }
    }
}
