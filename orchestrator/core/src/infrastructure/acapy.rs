// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! ACA-Py Admin API Client
//!
//! Reqwest implementation of the [`AdminAgent`] trait against one agent's
//! admin base URL. Every call goes through one generic `request` helper
//! that logs method/URL plus a truncated response body and maps failures
//! into the [`AgentError`] taxonomy. No retries here; polling is a
//! workflow-level concern.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Translate domain operations into admin-API requests

use crate::domain::agent::{
    AdminAgent, AgentError, AgentNetwork, AgentRole, ConnectionRecord, CredentialAttribute,
    PresentationExchangeRecord, PresentationRequest, PresentationState,
};
use crate::domain::config::{AgentEndpoint, OrchestratorConfig};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const HANDSHAKE_PROTOCOL: &str = "https://didcomm.org/didexchange/1.0";
const CREDENTIAL_PREVIEW_TYPE: &str = "issue-credential/2.0/credential-preview";
const RESPONSE_LOG_LIMIT: usize = 300;

pub struct AcaPyAdminClient {
    http: reqwest::Client,
    base_url: String,
    role: AgentRole,
    label: String,
}

impl AcaPyAdminClient {
    /// Build a client for one agent. `timeout` bounds every single request
    /// independently of any polling budget a workflow applies on top.
    pub fn new(
        role: AgentRole,
        endpoint: &AgentEndpoint,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .with_context(|| format!("failed to build HTTP client for {role} agent"))?;
        Ok(Self {
            http,
            base_url: endpoint.admin_url.trim_end_matches('/').to_string(),
            role,
            label: endpoint.label.clone(),
        })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<Value, AgentError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(role = %self.role, %method, %url, "admin request");

        let mut request = self.http.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| AgentError::Transport {
            role: self.role,
            detail: err.to_string(),
        })?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|err| AgentError::Transport {
            role: self.role,
            detail: err.to_string(),
        })?;
        debug!(role = %self.role, status, body = %truncate(&text), "admin response");

        if status >= 400 {
            return Err(AgentError::Api {
                role: self.role,
                status,
                detail: truncate(&text),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| AgentError::InvalidResponse {
            role: self.role,
            detail: err.to_string(),
        })
    }

    fn string_at(&self, value: &Value, pointer: &str) -> Result<String, AgentError> {
        value
            .pointer(pointer)
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| AgentError::InvalidResponse {
                role: self.role,
                detail: format!("missing field at {pointer}"),
            })
    }
}

#[async_trait]
impl AdminAgent for AcaPyAdminClient {
    fn role(&self) -> AgentRole {
        self.role
    }

    fn label(&self) -> &str {
        &self.label
    }

    async fn public_did(&self) -> Result<Option<String>, AgentError> {
        let body = self
            .request(Method::GET, "/wallet/did/public", None, &[])
            .await?;
        Ok(body
            .pointer("/result/did")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned))
    }

    async fn create_schema(
        &self,
        issuer_did: &str,
        name: &str,
        version: &str,
        attr_names: &[String],
    ) -> Result<String, AgentError> {
        let payload = json!({
            "schema": {
                "issuerId": issuer_did,
                "name": name,
                "version": version,
                "attrNames": attr_names,
            }
        });
        let body = self
            .request(Method::POST, "/anoncreds/schema", Some(&payload), &[])
            .await?;
        self.string_at(&body, "/schema_state/schema_id")
    }

    async fn create_credential_definition(
        &self,
        issuer_did: &str,
        schema_id: &str,
        tag: &str,
    ) -> Result<String, AgentError> {
        let payload = json!({
            "credential_definition": {
                "issuerId": issuer_did,
                "schemaId": schema_id,
                "tag": tag,
            }
        });
        let body = self
            .request(
                Method::POST,
                "/anoncreds/credential-definition",
                Some(&payload),
                &[],
            )
            .await?;
        self.string_at(
            &body,
            "/credential_definition_state/credential_definition_id",
        )
    }

    async fn create_invitation(&self) -> Result<Value, AgentError> {
        let payload = json!({ "handshake_protocols": [HANDSHAKE_PROTOCOL] });
        let body = self
            .request(
                Method::POST,
                "/out-of-band/create-invitation",
                Some(&payload),
                &[],
            )
            .await?;
        body.get("invitation")
            .cloned()
            .ok_or_else(|| AgentError::InvalidResponse {
                role: self.role,
                detail: "missing invitation in create-invitation response".into(),
            })
    }

    async fn receive_invitation(&self, invitation: &Value) -> Result<(), AgentError> {
        self.request(
            Method::POST,
            "/out-of-band/receive-invitation",
            Some(invitation),
            &[],
        )
        .await
        .map(|_| ())
    }

    async fn connections(
        &self,
        their_label: Option<&str>,
        state: Option<&str>,
    ) -> Result<Vec<ConnectionRecord>, AgentError> {
        let mut query = Vec::new();
        if let Some(label) = their_label {
            query.push(("their_label", label));
        }
        if let Some(state) = state {
            query.push(("state", state));
        }
        let body = self
            .request(Method::GET, "/connections", None, &query)
            .await?;
        let results = body
            .get("results")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        serde_json::from_value(results).map_err(|err| AgentError::InvalidResponse {
            role: self.role,
            detail: format!("bad connection listing: {err}"),
        })
    }

    async fn send_credential(
        &self,
        connection_id: &str,
        cred_def_id: &str,
        attributes: &[CredentialAttribute],
    ) -> Result<(), AgentError> {
        let payload = json!({
            "connection_id": connection_id,
            "filter": { "anoncreds": { "cred_def_id": cred_def_id } },
            "credential_preview": {
                "@type": CREDENTIAL_PREVIEW_TYPE,
                "attributes": attributes,
            }
        });
        self.request(
            Method::POST,
            "/issue-credential-2.0/send",
            Some(&payload),
            &[],
        )
        .await
        .map(|_| ())
    }

    async fn send_proof_request(
        &self,
        connection_id: &str,
        request: &PresentationRequest,
    ) -> Result<String, AgentError> {
        // Referent per attribute name, restricted to the cred def, so the
        // revealed attributes come back keyed by attribute name.
        let requested_attributes: HashMap<&str, Value> = request
            .attributes
            .iter()
            .map(|attr| {
                (
                    attr.name.as_str(),
                    json!({
                        "name": attr.name,
                        "restrictions": [{ "cred_def_id": attr.cred_def_id }],
                    }),
                )
            })
            .collect();
        let payload = json!({
            "connection_id": connection_id,
            "presentation_request": {
                "anoncreds": {
                    "name": request.name,
                    "version": request.version,
                    "requested_attributes": requested_attributes,
                    "requested_predicates": {},
                }
            }
        });
        let body = self
            .request(
                Method::POST,
                "/present-proof-2.0/send-request",
                Some(&payload),
                &[],
            )
            .await?;
        self.string_at(&body, "/pres_ex_id")
    }

    async fn proof_record(
        &self,
        pres_ex_id: &str,
    ) -> Result<PresentationExchangeRecord, AgentError> {
        let body = self
            .request(
                Method::GET,
                &format!("/present-proof-2.0/records/{pres_ex_id}"),
                None,
                &[],
            )
            .await?;

        let state: PresentationState =
            serde_json::from_value(body.get("state").cloned().unwrap_or(Value::Null)).map_err(
                |err| AgentError::InvalidResponse {
                    role: self.role,
                    detail: format!("bad presentation state: {err}"),
                },
            )?;

        // The admin API reports `verified` as the strings "true"/"false";
        // tolerate a plain bool as well.
        let verified = match body.get("verified") {
            Some(Value::Bool(flag)) => Some(*flag),
            Some(Value::String(flag)) => Some(flag == "true"),
            _ => None,
        };

        let mut revealed = HashMap::new();
        if let Some(attrs) = body
            .pointer("/by_format/pres/anoncreds/presentation/requested_proof/revealed_attrs")
            .and_then(Value::as_object)
        {
            for (referent, attr) in attrs {
                if let Some(raw) = attr.get("raw").and_then(Value::as_str) {
                    revealed.insert(referent.clone(), raw.to_string());
                }
            }
        }

        Ok(PresentationExchangeRecord {
            pres_ex_id: body
                .get("pres_ex_id")
                .and_then(Value::as_str)
                .unwrap_or(pres_ex_id)
                .to_string(),
            state,
            verified,
            revealed,
        })
    }
}

/// Build the three admin clients from configuration.
pub fn connect_network(config: &OrchestratorConfig) -> anyhow::Result<AgentNetwork> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    Ok(AgentNetwork {
        issuer: Arc::new(AcaPyAdminClient::new(
            AgentRole::Issuer,
            &config.agents.issuer,
            timeout,
        )?),
        holder: Arc::new(AcaPyAdminClient::new(
            AgentRole::Holder,
            &config.agents.holder,
            timeout,
        )?),
        verifier: Arc::new(AcaPyAdminClient::new(
            AgentRole::Verifier,
            &config.agents.verifier,
            timeout,
        )?),
    })
}

fn truncate(text: &str) -> String {
    if text.len() <= RESPONSE_LOG_LIMIT {
        return text.to_string();
    }
    let mut end = RESPONSE_LOG_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::{ConnectionState, RequestedAttribute};
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> AcaPyAdminClient {
        AcaPyAdminClient::new(
            AgentRole::Issuer,
            &AgentEndpoint {
                admin_url: server.url(),
                label: "Issuer".into(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn public_did_present_and_absent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/wallet/did/public")
            .with_body(r#"{"result": {"did": "did:sov:abc"}}"#)
            .create_async()
            .await;
        assert_eq!(
            client(&server).public_did().await.unwrap(),
            Some("did:sov:abc".to_string())
        );
        mock.assert_async().await;

        server
            .mock("GET", "/wallet/did/public")
            .with_body(r#"{"result": null}"#)
            .create_async()
            .await;
        assert_eq!(client(&server).public_did().await.unwrap(), None);
    }

    #[tokio::test]
    async fn status_400_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/anoncreds/schema")
            .with_status(400)
            .with_body("schema already exists")
            .create_async()
            .await;

        let err = client(&server)
            .create_schema("did:sov:abc", "plano-movel", "1.0", &["nome_plano".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn malformed_json_maps_to_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/wallet/did/public")
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = client(&server).public_did().await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn connection_refused_maps_to_transport_error() {
        let client = AcaPyAdminClient::new(
            AgentRole::Holder,
            &AgentEndpoint {
                // Reserved port with nothing listening.
                admin_url: "http://127.0.0.1:1".into(),
                label: "Holder".into(),
            },
            Duration::from_secs(1),
        )
        .unwrap();
        let err = client.public_did().await.unwrap_err();
        assert!(matches!(err, AgentError::Transport { .. }));
    }

    #[tokio::test]
    async fn create_schema_posts_expected_shape() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/anoncreds/schema")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "schema": {
                    "issuerId": "did:sov:abc",
                    "name": "plano-movel",
                    "version": "1.0",
                    "attrNames": ["nome_plano", "franquia"],
                }
            })))
            .with_body(r#"{"schema_state": {"schema_id": "schema:1"}}"#)
            .create_async()
            .await;

        let schema_id = client(&server)
            .create_schema(
                "did:sov:abc",
                "plano-movel",
                "1.0",
                &["nome_plano".into(), "franquia".into()],
            )
            .await
            .unwrap();
        assert_eq!(schema_id, "schema:1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn connections_filters_and_parses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/connections")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("their_label".into(), "Holder".into()),
                Matcher::UrlEncoded("state".into(), "active".into()),
            ]))
            .with_body(
                r#"{"results": [
                    {"connection_id": "conn-1", "their_label": "Holder", "state": "active"},
                    {"connection_id": "conn-2", "their_label": "Holder", "state": "request"}
                ]}"#,
            )
            .create_async()
            .await;

        let records = client(&server)
            .connections(Some("Holder"), Some("active"))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].connection_id, "conn-1");
        assert_eq!(records[0].state, ConnectionState::Active);
        assert_eq!(records[1].state, ConnectionState::Request);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn proof_request_returns_pres_ex_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/present-proof-2.0/send-request")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "connection_id": "conn-9",
                "presentation_request": {
                    "anoncreds": {
                        "name": "telco-access-check",
                        "requested_attributes": {
                            "nome_plano": {
                                "name": "nome_plano",
                                "restrictions": [{"cred_def_id": "creddef:1"}],
                            }
                        },
                    }
                }
            })))
            .with_body(r#"{"pres_ex_id": "pres-ex-7"}"#)
            .create_async()
            .await;

        let request = PresentationRequest {
            name: "telco-access-check".into(),
            version: "1.0".into(),
            attributes: vec![RequestedAttribute {
                name: "nome_plano".into(),
                cred_def_id: "creddef:1".into(),
            }],
        };
        let pres_ex_id = client(&server)
            .send_proof_request("conn-9", &request)
            .await
            .unwrap();
        assert_eq!(pres_ex_id, "pres-ex-7");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn proof_record_extracts_revealed_attributes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/present-proof-2.0/records/pres-ex-7")
            .with_body(
                r#"{
                    "pres_ex_id": "pres-ex-7",
                    "state": "done",
                    "verified": "true",
                    "by_format": {"pres": {"anoncreds": {"presentation": {"requested_proof": {
                        "revealed_attrs": {
                            "nome_plano": {"raw": "Turbo 5G"},
                            "franquia": {"raw": "500GB"}
                        }
                    }}}}}
                }"#,
            )
            .create_async()
            .await;

        let record = client(&server).proof_record("pres-ex-7").await.unwrap();
        assert_eq!(record.state, PresentationState::Done);
        assert_eq!(record.verified, Some(true));
        assert_eq!(record.revealed.get("nome_plano").unwrap(), "Turbo 5G");
        assert_eq!(record.revealed.get("franquia").unwrap(), "500GB");
    }

    #[tokio::test]
    async fn proof_record_without_verdict_is_tri_state_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/present-proof-2.0/records/pres-ex-8")
            .with_body(r#"{"pres_ex_id": "pres-ex-8", "state": "request-sent"}"#)
            .create_async()
            .await;

        let record = client(&server).proof_record("pres-ex-8").await.unwrap();
        assert_eq!(record.state, PresentationState::RequestSent);
        assert_eq!(record.verified, None);
        assert!(record.revealed.is_empty());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "á".repeat(400);
        let truncated = truncate(&text);
        assert!(truncated.chars().count() < 400);
        assert!(truncated.ends_with('…'));
    }
}
