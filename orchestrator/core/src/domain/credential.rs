// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Credential Catalog
//!
//! A [`DomainProfile`] describes the credential types one deployment works
//! with: schema names, versions, tags and attribute lists, plus which
//! credential is the subject of issuance and verification. The workflow
//! engine is parameterized by a profile instead of hard-coding one domain
//! per controller.

use serde::{Deserialize, Serialize};

/// A named, versioned declaration of the attributes issuable under one
/// credential type. The `tag` also keys the schema/cred-def ids in the
/// workflow context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSpec {
    pub name: String,
    pub version: String,
    pub tag: String,
    pub attributes: Vec<String>,
}

/// The set of credentials a deployment issues, and which of them is
/// issued/verified by the chat workflows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainProfile {
    /// Short profile name, used in proof-request names.
    pub name: String,

    /// Every credential whose schema and cred def Setup provisions.
    pub credentials: Vec<CredentialSpec>,

    /// Tag of the credential that IssueCredential and VerifyAccess target.
    pub issuance_tag: String,
}

impl DomainProfile {
    /// The credential spec IssueCredential/VerifyAccess operate on.
    ///
    /// Profiles are validated at load time, so a missing issuance tag is a
    /// construction bug, not a runtime condition.
    pub fn issuance_credential(&self) -> Option<&CredentialSpec> {
        self.credentials.iter().find(|c| c.tag == self.issuance_tag)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.credentials.is_empty() {
            return Err("profile declares no credentials".into());
        }
        for cred in &self.credentials {
            if cred.attributes.is_empty() {
                return Err(format!("credential '{}' declares no attributes", cred.tag));
            }
        }
        if self.issuance_credential().is_none() {
            return Err(format!(
                "issuance tag '{}' does not match any credential",
                self.issuance_tag
            ));
        }
        Ok(())
    }

    /// The canonical telecom profile: a KYC credential for subscriber
    /// onboarding and a mobile-plan credential that activation issues and
    /// access verification checks.
    pub fn telecom() -> Self {
        Self {
            name: "telco".into(),
            credentials: vec![
                CredentialSpec {
                    name: "cadastro-assinante".into(),
                    version: "1.0".into(),
                    tag: "kyc".into(),
                    attributes: vec!["nome_cliente".into(), "cpf".into()],
                },
                CredentialSpec {
                    name: "plano-movel".into(),
                    version: "1.0".into(),
                    tag: "plano".into(),
                    attributes: vec!["nome_plano".into(), "franquia".into()],
                },
            ],
            issuance_tag: "plano".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telecom_profile_is_valid() {
        let profile = DomainProfile::telecom();
        profile.validate().unwrap();
        let plan = profile.issuance_credential().unwrap();
        assert_eq!(plan.attributes, vec!["nome_plano", "franquia"]);
    }

    #[test]
    fn rejects_unknown_issuance_tag() {
        let mut profile = DomainProfile::telecom();
        profile.issuance_tag = "selo".into();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn rejects_empty_attribute_list() {
        let mut profile = DomainProfile::telecom();
        profile.credentials[0].attributes.clear();
        assert!(profile.validate().is_err());
    }
}
