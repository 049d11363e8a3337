// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! In-memory test double for the agent admin API.
//!
//! Records every call and serves programmable responses so workflow and
//! dispatcher tests run without any agent process.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use veritel_core::domain::agent::{
    AdminAgent, AgentError, AgentNetwork, AgentRole, ConnectionRecord, ConnectionState,
    CredentialAttribute, PresentationExchangeRecord, PresentationRequest, PresentationState,
};

#[derive(Default)]
struct MockState {
    calls: Vec<String>,
    public_did: Option<String>,
    fail_schema: bool,
    fail_cred_def: bool,
    connections: Vec<ConnectionRecord>,
    proof_records: VecDeque<PresentationExchangeRecord>,
    last_credential: Option<(String, String, Vec<CredentialAttribute>)>,
    last_proof_request: Option<(String, PresentationRequest)>,
}

pub struct MockAgent {
    role: AgentRole,
    label: String,
    seq: AtomicUsize,
    state: Mutex<MockState>,
}

impl MockAgent {
    pub fn new(role: AgentRole, label: &str) -> Arc<Self> {
        Arc::new(Self {
            role,
            label: label.to_string(),
            seq: AtomicUsize::new(0),
            state: Mutex::new(MockState::default()),
        })
    }

    pub fn set_public_did(&self, did: &str) {
        self.state.lock().unwrap().public_did = Some(did.to_string());
    }

    pub fn fail_schema_creation(&self) {
        self.state.lock().unwrap().fail_schema = true;
    }

    pub fn fail_cred_def_creation(&self) {
        self.state.lock().unwrap().fail_cred_def = true;
    }

    /// Fixed listing served by every `connections` call.
    pub fn set_connections(&self, records: Vec<ConnectionRecord>) {
        self.state.lock().unwrap().connections = records;
    }

    /// Queue of proof records; the last one keeps repeating once reached.
    pub fn push_proof_record(&self, record: PresentationExchangeRecord) {
        self.state.lock().unwrap().proof_records.push_back(record);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_credential(&self) -> Option<(String, String, Vec<CredentialAttribute>)> {
        self.state.lock().unwrap().last_credential.clone()
    }

    pub fn last_proof_request(&self) -> Option<(String, PresentationRequest)> {
        self.state.lock().unwrap().last_proof_request.clone()
    }

    fn record_call(&self, name: &str) {
        self.state.lock().unwrap().calls.push(name.to_string());
    }

    fn api_error(&self, detail: &str) -> AgentError {
        AgentError::Api {
            role: self.role,
            status: 422,
            detail: detail.to_string(),
        }
    }
}

#[async_trait]
impl AdminAgent for MockAgent {
    fn role(&self) -> AgentRole {
        self.role
    }

    fn label(&self) -> &str {
        &self.label
    }

    async fn public_did(&self) -> Result<Option<String>, AgentError> {
        self.record_call("public_did");
        Ok(self.state.lock().unwrap().public_did.clone())
    }

    async fn create_schema(
        &self,
        _issuer_did: &str,
        name: &str,
        _version: &str,
        _attr_names: &[String],
    ) -> Result<String, AgentError> {
        self.record_call("create_schema");
        if self.state.lock().unwrap().fail_schema {
            return Err(self.api_error("schema creation rejected"));
        }
        let n = self.seq.fetch_add(1, Ordering::SeqCst);
        Ok(format!("schema:{name}:{n}"))
    }

    async fn create_credential_definition(
        &self,
        _issuer_did: &str,
        schema_id: &str,
        tag: &str,
    ) -> Result<String, AgentError> {
        self.record_call("create_credential_definition");
        if self.state.lock().unwrap().fail_cred_def {
            return Err(self.api_error("cred def creation rejected"));
        }
        let n = self.seq.fetch_add(1, Ordering::SeqCst);
        Ok(format!("creddef:{tag}:{schema_id}:{n}"))
    }

    async fn create_invitation(&self) -> Result<serde_json::Value, AgentError> {
        self.record_call("create_invitation");
        Ok(serde_json::json!({ "@type": "out-of-band/1.1/invitation", "from": self.label }))
    }

    async fn receive_invitation(
        &self,
        _invitation: &serde_json::Value,
    ) -> Result<(), AgentError> {
        self.record_call("receive_invitation");
        Ok(())
    }

    async fn connections(
        &self,
        their_label: Option<&str>,
        state: Option<&str>,
    ) -> Result<Vec<ConnectionRecord>, AgentError> {
        self.record_call("connections");
        let listing = self.state.lock().unwrap().connections.clone();
        // Emulate server-side filtering.
        Ok(listing
            .into_iter()
            .filter(|record| {
                their_label.map_or(true, |label| record.their_label.as_deref() == Some(label))
                    && state.map_or(true, |state| {
                        state != "active" || record.state == ConnectionState::Active
                    })
            })
            .collect())
    }

    async fn send_credential(
        &self,
        connection_id: &str,
        cred_def_id: &str,
        attributes: &[CredentialAttribute],
    ) -> Result<(), AgentError> {
        self.record_call("send_credential");
        self.state.lock().unwrap().last_credential = Some((
            connection_id.to_string(),
            cred_def_id.to_string(),
            attributes.to_vec(),
        ));
        Ok(())
    }

    async fn send_proof_request(
        &self,
        connection_id: &str,
        request: &PresentationRequest,
    ) -> Result<String, AgentError> {
        self.record_call("send_proof_request");
        self.state.lock().unwrap().last_proof_request =
            Some((connection_id.to_string(), request.clone()));
        Ok("pres-ex-1".to_string())
    }

    async fn proof_record(
        &self,
        pres_ex_id: &str,
    ) -> Result<PresentationExchangeRecord, AgentError> {
        self.record_call("proof_record");
        let mut state = self.state.lock().unwrap();
        if state.proof_records.len() > 1 {
            Ok(state.proof_records.pop_front().expect("non-empty"))
        } else {
            state
                .proof_records
                .front()
                .cloned()
                .ok_or(AgentError::InvalidResponse {
                    role: self.role,
                    detail: format!("no proof record queued for {pres_ex_id}"),
                })
        }
    }
}

pub struct MockNetwork {
    pub network: AgentNetwork,
    pub issuer: Arc<MockAgent>,
    pub holder: Arc<MockAgent>,
    pub verifier: Arc<MockAgent>,
}

pub fn mock_network() -> MockNetwork {
    let issuer = MockAgent::new(AgentRole::Issuer, "Issuer");
    let holder = MockAgent::new(AgentRole::Holder, "Holder");
    let verifier = MockAgent::new(AgentRole::Verifier, "Verifier");
    MockNetwork {
        network: AgentNetwork {
            issuer: issuer.clone(),
            holder: holder.clone(),
            verifier: verifier.clone(),
        },
        issuer,
        holder,
        verifier,
    }
}

pub fn active_connection(id: &str, label: &str) -> ConnectionRecord {
    ConnectionRecord {
        connection_id: id.to_string(),
        their_label: Some(label.to_string()),
        state: ConnectionState::Active,
        created_at: None,
    }
}

pub fn proof_record(
    state: PresentationState,
    verified: Option<bool>,
    revealed: &[(&str, &str)],
) -> PresentationExchangeRecord {
    PresentationExchangeRecord {
        pres_ex_id: "pres-ex-1".to_string(),
        state,
        verified,
        revealed: revealed
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    }
}
