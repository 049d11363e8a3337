// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Workflow Context
//!
//! Identifiers discovered by earlier workflow steps and consumed by later
//! ones: the issuer DID, schema/cred-def id pairs per credential tag, and
//! connection ids per peer pair. An explicit object injected into every
//! workflow invocation — never a process global — so tests get isolation
//! and future multi-session support stays open.
//!
//! A key is populated once per Setup/Connect run; reading an unset key is
//! the caller's precondition failure, not a retryable condition. The
//! context lives for the process lifetime (no persistence across restarts).

use std::collections::HashMap;

/// The two peer pairs the workflows connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerPair {
    /// Operator-side connection used for issuance.
    IssuerHolder,
    /// Fresh connection created per verification run.
    VerifierHolder,
}

/// Schema and credential-definition ids provisioned for one credential tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredentialIds {
    pub schema_id: String,
    pub cred_def_id: String,
}

/// Mutable cross-call state of the orchestrator.
#[derive(Debug, Default)]
pub struct WorkflowContext {
    issuer_did: Option<String>,
    credentials: HashMap<String, IssuedCredentialIds>,
    connections: HashMap<PeerPair, String>,
}

impl WorkflowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issuer_did(&self) -> Option<&str> {
        self.issuer_did.as_deref()
    }

    pub fn set_issuer_did(&mut self, did: impl Into<String>) {
        self.issuer_did = Some(did.into());
    }

    pub fn credential_ids(&self, tag: &str) -> Option<&IssuedCredentialIds> {
        self.credentials.get(tag)
    }

    pub fn set_credential_ids(&mut self, tag: impl Into<String>, ids: IssuedCredentialIds) {
        self.credentials.insert(tag.into(), ids);
    }

    pub fn connection_id(&self, pair: PeerPair) -> Option<&str> {
        self.connections.get(&pair).map(String::as_str)
    }

    pub fn set_connection_id(&mut self, pair: PeerPair, connection_id: impl Into<String>) {
        self.connections.insert(pair, connection_id.into());
    }
}
