// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Orchestration Workflows
//!
//! The four credential-lifecycle procedures: infrastructure setup, peer
//! connection establishment, credential issuance and proof verification.
//! Each workflow is a linear pipeline of admin-API calls with early exit
//! on precondition failure; identifiers produced by one step feed the
//! next, and eventually-consistent transitions are awaited through the
//! polling primitive.
//!
//! Workflows return `Ok(outcome string)` for user-visible results
//! (including business-level denials) and a typed [`WorkflowError`] for
//! failures; the dispatcher turns both into chat responses.

use crate::application::poll::{poll_until, PollError, PollPolicy};
use crate::domain::agent::{
    AgentError, AgentNetwork, ConnectionRecord, ConnectionState, CredentialAttribute,
    PresentationRequest, PresentationState, RequestedAttribute,
};
use crate::domain::context::{IssuedCredentialIds, PeerPair, WorkflowContext};
use crate::domain::credential::{CredentialSpec, DomainProfile};
use std::collections::HashMap;
use tracing::{info, warn};

/// Failures a workflow can surface. Every variant renders a distinct
/// user-facing message at the dispatch boundary; nothing is swallowed.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("issuer has no public DID")]
    MissingDid,

    #[error("failed to create schema '{name}': {source}")]
    SchemaCreation {
        name: String,
        #[source]
        source: AgentError,
    },

    #[error("failed to create credential definition '{tag}': {source}")]
    CredDefCreation {
        tag: String,
        #[source]
        source: AgentError,
    },

    #[error("precondition not met: {0}")]
    Precondition(String),

    #[error("timed out waiting for {step}")]
    Timeout { step: &'static str },

    #[error("presentation verified but attribute '{missing}' was not revealed")]
    UnreadableProof { missing: String },

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl WorkflowError {
    fn from_poll(err: PollError, step: &'static str) -> Self {
        match err {
            PollError::TimedOut { .. } => WorkflowError::Timeout { step },
            PollError::Fatal(agent) => WorkflowError::Agent(agent),
        }
    }
}

/// Which end of a label-matched connection listing to take.
#[derive(Debug, Clone, Copy)]
enum SelectionOrder {
    First,
    Last,
}

/// The workflow engine: one instance per process, parameterized by the
/// deployment's credential profile.
pub struct WorkflowService {
    network: AgentNetwork,
    profile: DomainProfile,
}

impl WorkflowService {
    pub fn new(network: AgentNetwork, profile: DomainProfile) -> anyhow::Result<Self> {
        profile
            .validate()
            .map_err(|reason| anyhow::anyhow!("invalid domain profile: {reason}"))?;
        Ok(Self { network, profile })
    }

    pub fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    /// SetupInfrastructure: fetch the issuer DID, then create a schema and
    /// credential definition for every credential in the profile.
    ///
    /// Re-running provisions fresh ids server-side; deduplication is a
    /// documented non-goal.
    pub async fn setup(&self, ctx: &mut WorkflowContext) -> Result<String, WorkflowError> {
        info!(profile = %self.profile.name, "running infrastructure setup");

        let did = self
            .network
            .issuer
            .public_did()
            .await?
            .ok_or(WorkflowError::MissingDid)?;
        info!(%did, "issuer public DID");
        ctx.set_issuer_did(&did);

        for cred in &self.profile.credentials {
            let schema_id = self
                .network
                .issuer
                .create_schema(&did, &cred.name, &cred.version, &cred.attributes)
                .await
                .map_err(|source| WorkflowError::SchemaCreation {
                    name: cred.name.clone(),
                    source,
                })?;
            info!(tag = %cred.tag, %schema_id, "schema created");

            let cred_def_id = self
                .network
                .issuer
                .create_credential_definition(&did, &schema_id, &cred.tag)
                .await
                .map_err(|source| WorkflowError::CredDefCreation {
                    tag: cred.tag.clone(),
                    source,
                })?;
            info!(tag = %cred.tag, %cred_def_id, "credential definition created");

            ctx.set_credential_ids(
                cred.tag.clone(),
                IssuedCredentialIds {
                    schema_id,
                    cred_def_id,
                },
            );
        }

        Ok(format!(
            "Setup complete: {} credential types provisioned on the issuer.",
            self.profile.credentials.len()
        ))
    }

    /// EstablishConnection: issuer invites, holder accepts, then the
    /// issuer-side connection is located by the holder's label and polled
    /// until active.
    pub async fn connect(&self, ctx: &mut WorkflowContext) -> Result<String, WorkflowError> {
        info!("connecting operator to subscriber");

        let invitation = self.network.issuer.create_invitation().await?;
        self.network.holder.receive_invitation(&invitation).await?;

        let issuer = &self.network.issuer;
        let label = self.network.holder.label();
        let polled = poll_until(
            PollPolicy::CONNECTION_ACTIVATION,
            move || issuer.connections(Some(label), Some("active")),
            |records| select_connection(records, label, SelectionOrder::First).is_some(),
        )
        .await;

        let records = match polled {
            Ok(records) => records,
            Err(PollError::TimedOut { .. }) => {
                // Not fatal: the handshake was started and may still land.
                warn!("issuer-holder connection not active within budget");
                return Ok(
                    "Connection started but still pending on the issuer side; \
                     try issuing again in a moment."
                        .into(),
                );
            }
            Err(PollError::Fatal(agent)) => return Err(agent.into()),
        };

        let connection = select_connection(&records, label, SelectionOrder::First)
            .expect("predicate guaranteed a match");
        info!(connection_id = %connection.connection_id, "issuer-holder connection active");
        ctx.set_connection_id(PeerPair::IssuerHolder, connection.connection_id.clone());

        Ok("Connection between operator and subscriber established.".into())
    }

    /// IssueCredential: send a credential over the operator connection,
    /// matching the supplied attribute values to the issuance credential's
    /// declared attribute names.
    pub async fn issue(
        &self,
        ctx: &mut WorkflowContext,
        parameters: &HashMap<String, String>,
    ) -> Result<String, WorkflowError> {
        let cred = self.issuance_credential()?;

        let connection_id = ctx
            .connection_id(PeerPair::IssuerHolder)
            .ok_or_else(|| WorkflowError::Precondition("setup and connection required".into()))?
            .to_string();
        let cred_def_id = ctx
            .credential_ids(&cred.tag)
            .ok_or_else(|| WorkflowError::Precondition("setup and connection required".into()))?
            .cred_def_id
            .clone();

        let attributes = cred
            .attributes
            .iter()
            .map(|name| {
                parameters
                    .get(name)
                    .map(|value| CredentialAttribute {
                        name: name.clone(),
                        value: value.clone(),
                    })
                    .ok_or_else(|| {
                        WorkflowError::Precondition(format!("missing attribute '{name}'"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(connection_id = %connection_id, credential = %cred.name, "sending credential");
        self.network
            .issuer
            .send_credential(&connection_id, &cred_def_id, &attributes)
            .await?;

        // The confirmation must echo back exactly what the caller supplied.
        Ok(format!(
            "Credential '{}' issued to the subscriber: {}.",
            cred.name,
            render_attributes(&attributes)
        ))
    }

    /// VerifyAccess: fresh verifier-holder connection, proof request
    /// restricted to the stored credential definition, long poll on the
    /// presentation exchange, then terminal-state mapping.
    pub async fn verify(&self, ctx: &mut WorkflowContext) -> Result<String, WorkflowError> {
        let cred = self.issuance_credential()?;
        let cred_def_id = ctx
            .credential_ids(&cred.tag)
            .ok_or_else(|| {
                WorkflowError::Precondition("setup required before verification".into())
            })?
            .cred_def_id
            .clone();

        // Independent of any prior issuer-holder connection.
        let invitation = self.network.verifier.create_invitation().await?;
        self.network.holder.receive_invitation(&invitation).await?;

        let verifier = &self.network.verifier;
        let label = self.network.holder.label();
        let records = poll_until(
            PollPolicy::CONNECTION_ACTIVATION,
            move || verifier.connections(Some(label), Some("active")),
            |records| select_connection(records, label, SelectionOrder::Last).is_some(),
        )
        .await
        .map_err(|err| WorkflowError::from_poll(err, "verifier connection activation"))?;

        let connection_id = select_connection(&records, label, SelectionOrder::Last)
            .expect("predicate guaranteed a match")
            .connection_id
            .clone();
        info!(%connection_id, "verifier-holder connection active");
        ctx.set_connection_id(PeerPair::VerifierHolder, connection_id.clone());

        let request = PresentationRequest {
            name: format!("{}-access-check", self.profile.name),
            version: "1.0".into(),
            attributes: cred
                .attributes
                .iter()
                .map(|name| RequestedAttribute {
                    name: name.clone(),
                    cred_def_id: cred_def_id.clone(),
                })
                .collect(),
        };

        let pres_ex_id = self
            .network
            .verifier
            .send_proof_request(&connection_id, &request)
            .await?;
        info!(%pres_ex_id, "proof request sent");

        let pres_ex = pres_ex_id.as_str();
        let record = poll_until(
            PollPolicy::PRESENTATION_VERIFICATION,
            move || verifier.proof_record(pres_ex),
            |record| record.state.is_terminal(),
        )
        .await
        .map_err(|err| WorkflowError::from_poll(err, "presentation verification"))?;

        if record.state == PresentationState::Abandoned {
            return Ok("The subscriber rejected the proof request. Access not granted.".into());
        }

        if record.verified != Some(true) {
            return Ok("Access denied: the presented credential did not verify.".into());
        }

        let revealed = cred
            .attributes
            .iter()
            .map(|name| {
                record
                    .revealed
                    .get(name)
                    .map(|value| CredentialAttribute {
                        name: name.clone(),
                        value: value.clone(),
                    })
                    .ok_or_else(|| WorkflowError::UnreadableProof {
                        missing: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(format!(
            "Access granted. Verified credential attributes: {}.",
            render_attributes(&revealed)
        ))
    }

    fn issuance_credential(&self) -> Result<&CredentialSpec, WorkflowError> {
        // Validated at construction; guard anyway so a hand-built profile
        // cannot panic a workflow.
        self.profile.issuance_credential().ok_or_else(|| {
            WorkflowError::Precondition(format!(
                "profile has no credential tagged '{}'",
                self.profile.issuance_tag
            ))
        })
    }
}

/// Pick a usable connection among label matches.
///
/// Best-effort and racy: the admin API offers no correlation between an
/// invitation and the connection it produced, so we match on the
/// counterparty label and take one end of the listing. Correlate by
/// invitation/thread id instead if the admin API ever exposes it.
fn select_connection<'a>(
    records: &'a [ConnectionRecord],
    label: &str,
    order: SelectionOrder,
) -> Option<&'a ConnectionRecord> {
    let mut matches = records.iter().filter(|record| {
        record.state == ConnectionState::Active && record.their_label.as_deref() == Some(label)
    });
    match order {
        SelectionOrder::First => matches.next(),
        SelectionOrder::Last => matches.last(),
    }
}

fn render_attributes(attributes: &[CredentialAttribute]) -> String {
    attributes
        .iter()
        .map(|attr| format!("{}='{}'", attr.name, attr.value))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, label: &str, state: ConnectionState) -> ConnectionRecord {
        ConnectionRecord {
            connection_id: id.into(),
            their_label: Some(label.into()),
            state,
            created_at: None,
        }
    }

    #[test]
    fn selects_first_and_last_label_match() {
        let records = vec![
            record("conn-new", "Holder", ConnectionState::Active),
            record("conn-other", "Verifier", ConnectionState::Active),
            record("conn-old", "Holder", ConnectionState::Active),
        ];
        assert_eq!(
            select_connection(&records, "Holder", SelectionOrder::First)
                .unwrap()
                .connection_id,
            "conn-new"
        );
        assert_eq!(
            select_connection(&records, "Holder", SelectionOrder::Last)
                .unwrap()
                .connection_id,
            "conn-old"
        );
    }

    #[test]
    fn ignores_inactive_connections() {
        let records = vec![record("conn-1", "Holder", ConnectionState::Request)];
        assert!(select_connection(&records, "Holder", SelectionOrder::First).is_none());
    }
}
