//! Provider traits for upstream content adapters.
//!
//! Each upstream is wrapped in an adapter implementing [`ImageProvider`] or
//! [`FeedProvider`]. Adapters normalize provider-specific payloads into the
//! common [`ImageResult`]/[`FeedPost`] shapes and report a
//! [`ProviderOutcome`] instead of raising: the registry walks adapters in
//! priority order and treats `Empty` and `Failure` identically as
//! "try the next one".
//!
//! # Fallback Semantics
//!
//! - `Success` short-circuits the chain; later providers are never invoked.
//! - `Empty` means the upstream answered but had nothing usable.
//! - `Failure` absorbs transport errors, timeouts, non-2xx statuses, and
//!   malformed payloads; the reason is logged, never surfaced to callers.
//!
//! Providers that synthesize results locally (the unkeyed image source and
//! the static fallbacks) report `is_fallback() == true`, which marks the
//! resolution as degraded so it is cached with a shorter TTL.

use async_trait::async_trait;

use crate::types::{FeedPost, ImageResult, ProviderOutcome};

/// Provider for image search.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Provider tag, echoed as `source` in responses and used in logs.
    fn name(&self) -> &str;

    /// Whether results are synthesized rather than fetched from a real
    /// upstream. Degraded results are cached with a shorter TTL so real
    /// upstreams are retried sooner.
    fn is_fallback(&self) -> bool {
        false
    }

    /// Fetch up to `count` images for `query`.
    async fn fetch_images(&self, query: &str, count: usize) -> ProviderOutcome<ImageResult>;
}

/// Provider for topic-scoped feed posts.
#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Provider tag, echoed as `source` in responses and used in logs.
    fn name(&self) -> &str;

    /// Whether results are synthesized rather than fetched from a real
    /// upstream.
    fn is_fallback(&self) -> bool {
        false
    }

    /// Fetch up to `limit` posts for `topic`.
    async fn fetch_posts(&self, topic: &str, limit: usize) -> ProviderOutcome<FeedPost>;
}
