//! Provider call outcomes and chain resolutions.

use serde::{Deserialize, Serialize};

/// Outcome of a single provider fetch.
///
/// Adapters never raise past this boundary: transport errors, timeouts,
/// non-2xx statuses, and malformed payloads are all reported as
/// [`Failure`](ProviderOutcome::Failure), and a well-formed response with
/// no usable entries is [`Empty`](ProviderOutcome::Empty). The registry
/// treats `Empty` and `Failure` identically — both advance the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome<T> {
    /// Provider produced at least one normalized entry.
    Success(Vec<T>),
    /// Provider responded but had nothing usable for this query.
    Empty,
    /// Provider call failed; the reason is logged, never surfaced to callers.
    Failure(String),
}

impl<T> ProviderOutcome<T> {
    /// Wrap a vec, mapping an empty one to `Empty`.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            ProviderOutcome::Empty
        } else {
            ProviderOutcome::Success(items)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success(_))
    }
}

/// A resolved request: the winning provider's entries plus its tag.
///
/// `source` is part of the observable contract — handlers echo it in the
/// response payload. `degraded` is set when the winning provider is a
/// synthesized or static source, which signals the gateway to cache the
/// result with a shorter TTL so real upstreams are retried sooner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution<T> {
    pub items: Vec<T>,
    pub source: String,
    pub degraded: bool,
}
