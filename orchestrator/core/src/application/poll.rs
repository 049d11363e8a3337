// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Polling Primitive
//!
//! Bounded-retry waiting for eventually-consistent agent state. Any step
//! that waits for an agent-side transition (connection becomes active,
//! presentation reaches a terminal state) goes through [`poll_until`].
//!
//! Fetch errors are transient by default: a poll loop keeps going when a
//! single fetch fails, because "agent briefly unreachable" and "state not
//! there yet" look the same from here. Callers that know better can mark
//! error classes fatal via [`poll_until_with`].

use crate::domain::agent::AgentError;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// A named retry budget: how many attempts, how far apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    /// Connection handshakes complete in a few seconds when both agents
    /// auto-accept; a short budget is enough.
    pub const CONNECTION_ACTIVATION: PollPolicy = PollPolicy {
        max_attempts: 15,
        interval: Duration::from_secs(1),
    };

    /// Proof responses involve the holder's wallet and are much slower
    /// than the automatic handshake; this budget is deliberately distinct
    /// from `CONNECTION_ACTIVATION` and must stay so.
    pub const PRESENTATION_VERIFICATION: PollPolicy = PollPolicy {
        max_attempts: 90,
        interval: Duration::from_secs(1),
    };

    /// Upper bound on the wall-clock time a loop under this policy spends.
    pub fn wall_clock_bound(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("condition not reached after {attempts} attempts")]
    TimedOut { attempts: u32 },

    #[error(transparent)]
    Fatal(AgentError),
}

/// Poll `fetch` until `predicate` holds or the budget is exhausted.
/// Fetch errors are treated as not-ready and retried.
pub async fn poll_until<T, F, Fut, P>(
    policy: PollPolicy,
    fetch: F,
    predicate: P,
) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AgentError>>,
    P: Fn(&T) -> bool,
{
    poll_until_with(policy, fetch, predicate, |_| false).await
}

/// [`poll_until`] with a caller-supplied fatal-error classifier: when
/// `is_fatal` returns true for a fetch error, polling aborts immediately.
pub async fn poll_until_with<T, F, Fut, P, C>(
    policy: PollPolicy,
    mut fetch: F,
    predicate: P,
    is_fatal: C,
) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AgentError>>,
    P: Fn(&T) -> bool,
    C: Fn(&AgentError) -> bool,
{
    for attempt in 1..=policy.max_attempts {
        match fetch().await {
            Ok(value) if predicate(&value) => return Ok(value),
            Ok(_) => {
                debug!(attempt, max = policy.max_attempts, "condition not reached yet");
            }
            Err(err) if is_fatal(&err) => return Err(PollError::Fatal(err)),
            Err(err) => {
                debug!(attempt, max = policy.max_attempts, error = %err, "fetch failed, retrying");
            }
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    Err(PollError::TimedOut {
        attempts: policy.max_attempts,
    })
}
