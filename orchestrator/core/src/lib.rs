// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Veritel core
//!
//! Chat-driven orchestrator for a three-agent ACA-Py network (issuer,
//! holder, verifier). Natural-language messages are classified into
//! intents and routed to credential-lifecycle workflows that drive the
//! agents' admin HTTP APIs.
//!
//! # Architecture
//!
//! - **domain** — records, errors, configuration and the trait seams
//!   (`AdminAgent`, `IntentClassifier`).
//! - **application** — the workflow engine, polling primitive and intent
//!   dispatcher.
//! - **infrastructure** — reqwest adapters for the ACA-Py admin API and
//!   the Ollama classifier.
//! - **presentation** — the axum chat API.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
