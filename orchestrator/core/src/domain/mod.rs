// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod agent;
pub mod config;
pub mod context;
pub mod credential;
pub mod intent;
