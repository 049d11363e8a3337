// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Orchestrator Configuration
//!
//! YAML configuration for the chat orchestrator: the three agents' admin
//! base URLs and labels, the classifier endpoint/model, the HTTP bind
//! address, and the per-request timeout applied to every outbound admin
//! call (distinct from the polling budgets).
//!
//! Discovery order: explicit path → `VERITEL_CONFIG_PATH` →
//! `./veritel.yaml` → `~/.veritel/config.yaml`. Missing everywhere falls
//! back to [`OrchestratorConfig::default`], which matches the reference
//! local deployment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One agent's admin API location and the label it presents to peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEndpoint {
    pub admin_url: String,
    pub label: String,
}

/// The three agents of the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentsConfig {
    pub issuer: AgentEndpoint,
    pub holder: AgentEndpoint,
    pub verifier: AgentEndpoint,
}

/// Intent-classifier backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub model: String,
}

/// Inbound chat API bind address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub agents: AgentsConfig,
    pub classifier: ClassifierConfig,
    pub http: HttpConfig,

    /// Timeout for every single outbound admin-API request, in seconds.
    /// Bounds a hung agent independently of any polling budget.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            agents: AgentsConfig {
                issuer: AgentEndpoint {
                    admin_url: "http://localhost:8001".into(),
                    label: "Issuer".into(),
                },
                holder: AgentEndpoint {
                    admin_url: "http://localhost:8011".into(),
                    label: "Holder".into(),
                },
                verifier: AgentEndpoint {
                    admin_url: "http://localhost:8021".into(),
                    label: "Verifier".into(),
                },
            },
            classifier: ClassifierConfig {
                endpoint: "http://localhost:11434".into(),
                model: "phi3:mini".into(),
            },
            http: HttpConfig {
                host: "0.0.0.0".into(),
                port: 8080,
            },
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Configuration loading/validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl OrchestratorConfig {
    /// Load from an explicit path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Discover a config file, falling back to defaults when none exists.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        for candidate in Self::discovery_paths() {
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    /// Paths checked by [`load_or_default`], in order.
    pub fn discovery_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(env_path) = std::env::var("VERITEL_CONFIG_PATH") {
            paths.push(PathBuf::from(env_path));
        }
        paths.push(PathBuf::from("./veritel.yaml"));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".veritel").join("config.yaml"));
        }
        paths
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, endpoint) in [
            ("issuer", &self.agents.issuer),
            ("holder", &self.agents.holder),
            ("verifier", &self.agents.verifier),
        ] {
            if !endpoint.admin_url.starts_with("http") {
                return Err(ConfigError::Invalid(format!(
                    "{name} admin_url must be an http(s) URL, got '{}'",
                    endpoint.admin_url
                )));
            }
            if endpoint.label.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} label is empty")));
            }
        }
        if !self.classifier.endpoint.starts_with("http") {
            return Err(ConfigError::Invalid(format!(
                "classifier endpoint must be an http(s) URL, got '{}'",
                self.classifier.endpoint
            )));
        }
        if self.classifier.model.trim().is_empty() {
            return Err(ConfigError::Invalid("classifier model is empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Render as YAML, for `config generate`.
    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(self).expect("config serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        OrchestratorConfig::default().validate().unwrap();
    }

    #[test]
    fn yaml_round_trip() {
        let config = OrchestratorConfig::default();
        let parsed: OrchestratorConfig = serde_yaml::from_str(&config.to_yaml()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", OrchestratorConfig::default().to_yaml()).unwrap();

        let loaded = OrchestratorConfig::load(file.path()).unwrap();
        assert_eq!(loaded.agents.issuer.label, "Issuer");
        assert_eq!(loaded.request_timeout_secs, 30);
    }

    #[test]
    fn rejects_non_http_url() {
        let mut config = OrchestratorConfig::default();
        config.agents.holder.admin_url = "localhost:8011".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(message)) if message.contains("holder")
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = OrchestratorConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = OrchestratorConfig::load(Path::new("/nonexistent/veritel.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
