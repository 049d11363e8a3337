// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Agent Domain Interface (Anti-Corruption Layer)
//!
//! Defines the domain view of an ACA-Py agent's admin API: the records the
//! orchestrator observes, the errors an agent call can produce, and the
//! `AdminAgent` trait implemented in `infrastructure/acapy.rs`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Isolate workflows from the admin-API wire format

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// The three agent roles in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Issuer,
    Holder,
    Verifier,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Issuer => write!(f, "issuer"),
            AgentRole::Holder => write!(f, "holder"),
            AgentRole::Verifier => write!(f, "verifier"),
        }
    }
}

/// Lifecycle state of a peer connection, as reported by an agent.
///
/// Only `Active` is usable for credential or proof traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionState {
    Invitation,
    Request,
    Response,
    Active,
    Abandoned,
    #[serde(other)]
    Other,
}

/// A connection as listed by `GET /connections`, observed (never owned)
/// by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub connection_id: String,
    #[serde(default)]
    pub their_label: Option<String>,
    pub state: ConnectionState,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// State of a presentation exchange on the verifier side.
///
/// Progresses `request-sent -> presentation-received -> done | abandoned`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresentationState {
    RequestSent,
    PresentationReceived,
    Done,
    Verified,
    Abandoned,
    #[serde(other)]
    Other,
}

impl PresentationState {
    /// Terminal states in which the `verified` flag is meaningful.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PresentationState::Done | PresentationState::Verified | PresentationState::Abandoned
        )
    }
}

/// A presentation-exchange record as observed on the verifier.
///
/// `verified` is tri-state: absent until the exchange reaches a terminal
/// state, then `true` or `false`. `revealed` holds the plaintext attribute
/// values disclosed by the holder, keyed by attribute name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationExchangeRecord {
    pub pres_ex_id: String,
    pub state: PresentationState,
    pub verified: Option<bool>,
    #[serde(default)]
    pub revealed: HashMap<String, String>,
}

/// One attribute of a credential preview or a revealed proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialAttribute {
    pub name: String,
    pub value: String,
}

/// A proof request: each attribute must come from a credential issued
/// under the given credential definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationRequest {
    pub name: String,
    pub version: String,
    pub attributes: Vec<RequestedAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedAttribute {
    pub name: String,
    pub cred_def_id: String,
}

/// Errors produced by a single agent admin-API call.
///
/// No retries happen at this layer; polling loops in the application layer
/// decide which of these are transient.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentError {
    #[error("transport failure talking to {role} agent: {detail}")]
    Transport { role: AgentRole, detail: String },

    #[error("{role} admin API returned HTTP {status}: {detail}")]
    Api {
        role: AgentRole,
        status: u16,
        detail: String,
    },

    #[error("unexpected response from {role} agent: {detail}")]
    InvalidResponse { role: AgentRole, detail: String },
}

impl AgentError {
    pub fn role(&self) -> AgentRole {
        match self {
            AgentError::Transport { role, .. }
            | AgentError::Api { role, .. }
            | AgentError::InvalidResponse { role, .. } => *role,
        }
    }
}

/// Domain interface over one agent's admin API.
///
/// One implementation (`AcaPyAdminClient`), three instances — issuer,
/// holder and verifier — collected in [`AgentNetwork`].
#[async_trait]
pub trait AdminAgent: Send + Sync {
    /// The role this agent plays in the network.
    fn role(&self) -> AgentRole;

    /// The label this agent presents to peers (`their_label` on the
    /// counterparty's connection records).
    fn label(&self) -> &str;

    /// `GET /wallet/did/public`. `None` when the agent has no public DID.
    async fn public_did(&self) -> Result<Option<String>, AgentError>;

    /// `POST /anoncreds/schema`. Returns the new schema id.
    async fn create_schema(
        &self,
        issuer_did: &str,
        name: &str,
        version: &str,
        attr_names: &[String],
    ) -> Result<String, AgentError>;

    /// `POST /anoncreds/credential-definition`. Returns the new cred-def id.
    async fn create_credential_definition(
        &self,
        issuer_did: &str,
        schema_id: &str,
        tag: &str,
    ) -> Result<String, AgentError>;

    /// `POST /out-of-band/create-invitation`. Returns the portable
    /// invitation object to hand to the counterparty.
    async fn create_invitation(&self) -> Result<serde_json::Value, AgentError>;

    /// `POST /out-of-band/receive-invitation` with a raw invitation object.
    async fn receive_invitation(&self, invitation: &serde_json::Value) -> Result<(), AgentError>;

    /// `GET /connections`, optionally filtered by counterparty label and
    /// connection state.
    async fn connections(
        &self,
        their_label: Option<&str>,
        state: Option<&str>,
    ) -> Result<Vec<ConnectionRecord>, AgentError>;

    /// `POST /issue-credential-2.0/send`: offer and issue in one shot over
    /// an active connection.
    async fn send_credential(
        &self,
        connection_id: &str,
        cred_def_id: &str,
        attributes: &[CredentialAttribute],
    ) -> Result<(), AgentError>;

    /// `POST /present-proof-2.0/send-request`. Returns the
    /// presentation-exchange id to poll.
    async fn send_proof_request(
        &self,
        connection_id: &str,
        request: &PresentationRequest,
    ) -> Result<String, AgentError>;

    /// `GET /present-proof-2.0/records/{pres_ex_id}`.
    async fn proof_record(
        &self,
        pres_ex_id: &str,
    ) -> Result<PresentationExchangeRecord, AgentError>;
}

/// The three agents a workflow orchestrates.
#[derive(Clone)]
pub struct AgentNetwork {
    pub issuer: Arc<dyn AdminAgent>,
    pub holder: Arc<dyn AdminAgent>,
    pub verifier: Arc<dyn AdminAgent>,
}

impl AgentNetwork {
    pub fn agent(&self, role: AgentRole) -> &Arc<dyn AdminAgent> {
        match role {
            AgentRole::Issuer => &self.issuer,
            AgentRole::Holder => &self.holder,
            AgentRole::Verifier => &self.verifier,
        }
    }
}
