//! Provider registry with fallback chain semantics.
//!
//! The `ProviderRegistry` stores providers in priority order (index 0 =
//! highest) — one chain for images, one for feeds. When a resolution is
//! requested, it tries providers in order until one yields a non-empty
//! result.
//!
//! # Fallback Triggers
//!
//! The registry falls through to the next provider on:
//! - `Empty` — the upstream answered but had nothing usable
//! - `Failure` — transport error, timeout, non-2xx, or malformed payload
//!
//! The two are deliberately treated identically; either way the caller's
//! best chance is the next provider. A `Success` short-circuits the chain —
//! lower-priority providers are never invoked, which also keeps upstream
//! cost down.
//!
//! # Fallback Chain Flow
//!
//! ```text
//! Handler: registry.resolve_images("Salalah", 3)
//!                     │
//!                     ▼
//!         ┌─────────────────────┐
//!         │  PexelsClient       │ ──► keyed search; Empty/Failure: fall through
//!         │  (priority 0)       │
//!         └─────────┬───────────┘
//!                   │
//!                   ▼
//!         ┌─────────────────────┐
//!         │  UnsplashClient     │ ──► keyed search; Empty/Failure: fall through
//!         │  (priority 1)       │
//!         └─────────┬───────────┘
//!                   │
//!                   ▼
//!         ┌─────────────────────┐
//!         │  UnsplashSource     │ ──► synthesized URLs, always count entries
//!         │  (priority 2)       │
//!         └─────────────────────┘
//! ```
//!
//! Chains built by [`MuninnBuilder`](crate::MuninnBuilder) always end in a
//! static provider that cannot fail, so exhaustion is a defensive state:
//! reaching it means a hand-assembled chain is misconfigured, which is
//! logged at error level and counted separately.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, instrument, warn};

use crate::telemetry;

use super::traits::{FeedProvider, ImageProvider};
use crate::types::{FeedPost, ImageResult, ProviderOutcome, Resolution};
use crate::{MuninnError, Result};

/// Registry of providers with fallback chain semantics.
///
/// Providers are stored in priority order (index 0 = highest priority).
/// Registration order defines priority: first registered = tried first.
/// Reordering a chain is a configuration change, not a code change.
#[derive(Default)]
pub struct ProviderRegistry {
    images: Vec<Arc<dyn ImageProvider>>,
    feeds: Vec<Arc<dyn FeedProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Registration methods (appends to end = lowest priority)
    // Call in priority order: first registered = highest priority
    // ========================================================================

    /// Add an image provider (appended to end of chain).
    pub fn add_image(&mut self, provider: Arc<dyn ImageProvider>) {
        self.images.push(provider);
    }

    /// Add a feed provider (appended to end of chain).
    pub fn add_feed(&mut self, provider: Arc<dyn FeedProvider>) {
        self.feeds.push(provider);
    }

    // ========================================================================
    // Fallback chain execution
    // First Success wins and short-circuits; Empty and Failure both advance.
    // ========================================================================

    /// Resolve an image request through the fallback chain.
    #[instrument(skip(self, query), fields(operation = "images"))]
    pub async fn resolve_images(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Resolution<ImageResult>> {
        let start = Instant::now();
        if self.images.is_empty() {
            return Err(MuninnError::NoProvider);
        }

        for provider in &self.images {
            match provider.fetch_images(query, count).await {
                ProviderOutcome::Success(items) => {
                    Self::record_request("images", provider.name(), start, true);
                    return Ok(Resolution {
                        items,
                        source: provider.name().to_string(),
                        degraded: provider.is_fallback(),
                    });
                }
                ProviderOutcome::Empty => {
                    warn!(provider = provider.name(), query, "provider returned no images");
                }
                ProviderOutcome::Failure(reason) => {
                    warn!(provider = provider.name(), %reason, "image provider failed");
                }
            }
            Self::record_request("images", provider.name(), start, false);
        }

        Self::record_exhausted("images");
        Err(MuninnError::Exhausted)
    }

    /// Resolve a feed request through the fallback chain.
    #[instrument(skip(self, topic), fields(operation = "posts"))]
    pub async fn resolve_posts(&self, topic: &str, limit: usize) -> Result<Resolution<FeedPost>> {
        let start = Instant::now();
        if self.feeds.is_empty() {
            return Err(MuninnError::NoProvider);
        }

        for provider in &self.feeds {
            match provider.fetch_posts(topic, limit).await {
                ProviderOutcome::Success(items) => {
                    Self::record_request("posts", provider.name(), start, true);
                    return Ok(Resolution {
                        items,
                        source: provider.name().to_string(),
                        degraded: provider.is_fallback(),
                    });
                }
                ProviderOutcome::Empty => {
                    warn!(provider = provider.name(), topic, "provider returned no posts");
                }
                ProviderOutcome::Failure(reason) => {
                    warn!(provider = provider.name(), %reason, "feed provider failed");
                }
            }
            Self::record_request("posts", provider.name(), start, false);
        }

        Self::record_exhausted("posts");
        Err(MuninnError::Exhausted)
    }

    // ========================================================================
    // Capability introspection
    // ========================================================================

    /// Check if any image providers are registered.
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// Check if any feed providers are registered.
    pub fn has_feeds(&self) -> bool {
        !self.feeds.is_empty()
    }

    /// List registered image provider tags, in priority order.
    pub fn image_provider_names(&self) -> Vec<String> {
        self.images.iter().map(|p| p.name().to_string()).collect()
    }

    /// List registered feed provider tags, in priority order.
    pub fn feed_provider_names(&self) -> Vec<String> {
        self.feeds.iter().map(|p| p.name().to_string()).collect()
    }

    // ========================================================================
    // Metrics recording
    // ========================================================================

    /// Record request outcome metrics (counter + histogram).
    fn record_request(operation: &'static str, provider: &str, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        let elapsed = start.elapsed().as_secs_f64();
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => provider.to_owned(),
            "operation" => operation,
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => provider.to_owned(),
            "operation" => operation,
        )
        .record(elapsed);
    }

    /// Record a chain exhaustion — a configuration bug, not a runtime state.
    fn record_exhausted(operation: &'static str) {
        error!(operation, "provider chain exhausted; chains should end in a static fallback");
        metrics::counter!(telemetry::FALLBACK_EXHAUSTED_TOTAL, "operation" => operation)
            .increment(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    /// Mock image provider with a scripted outcome and a call counter.
    struct MockImageProvider {
        name: &'static str,
        outcome: ProviderOutcome<ImageResult>,
        fallback: bool,
        calls: AtomicUsize,
    }

    impl MockImageProvider {
        fn succeeding(name: &'static str, urls: &[&str]) -> Self {
            Self {
                name,
                outcome: ProviderOutcome::Success(
                    urls.iter().map(|u| ImageResult::bare(*u)).collect(),
                ),
                fallback: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn with_outcome(name: &'static str, outcome: ProviderOutcome<ImageResult>) -> Self {
            Self {
                name,
                outcome,
                fallback: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageProvider for MockImageProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn is_fallback(&self) -> bool {
            self.fallback
        }

        async fn fetch_images(&self, _query: &str, _count: usize) -> ProviderOutcome<ImageResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    /// Mock feed provider with a scripted outcome.
    struct MockFeedProvider {
        name: &'static str,
        outcome: ProviderOutcome<FeedPost>,
    }

    #[async_trait]
    impl FeedProvider for MockFeedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_posts(&self, _topic: &str, _limit: usize) -> ProviderOutcome<FeedPost> {
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn first_success_wins() {
        let mut registry = ProviderRegistry::new();
        registry.add_image(Arc::new(MockImageProvider::succeeding("primary", &["a"])));
        registry.add_image(Arc::new(MockImageProvider::succeeding("secondary", &["b"])));

        let resolution = registry.resolve_images("oman", 1).await.unwrap();
        assert_eq!(resolution.source, "primary");
        assert_eq!(resolution.items[0].url, "a");
        assert!(!resolution.degraded);
    }

    #[tokio::test]
    async fn success_short_circuits_lower_priority() {
        let primary = Arc::new(MockImageProvider::with_outcome(
            "primary",
            ProviderOutcome::Failure("boom".into()),
        ));
        let secondary = Arc::new(MockImageProvider::succeeding("secondary", &["b"]));
        let never = Arc::new(MockImageProvider::succeeding("never", &["c"]));

        let mut registry = ProviderRegistry::new();
        registry.add_image(primary.clone());
        registry.add_image(secondary.clone());
        registry.add_image(never.clone());

        let resolution = registry.resolve_images("oman", 1).await.unwrap();
        assert_eq!(resolution.source, "secondary");
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 1);
        assert_eq!(never.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_and_failure_both_advance() {
        for skipped in [
            ProviderOutcome::Empty,
            ProviderOutcome::Failure("down".into()),
        ] {
            let mut registry = ProviderRegistry::new();
            registry.add_image(Arc::new(MockImageProvider::with_outcome("first", skipped)));
            registry.add_image(Arc::new(MockImageProvider::succeeding("second", &["x"])));

            let resolution = registry.resolve_images("oman", 1).await.unwrap();
            assert_eq!(resolution.source, "second");
        }
    }

    #[tokio::test]
    async fn fallback_provider_marks_resolution_degraded() {
        let mut fallback = MockImageProvider::succeeding("fallback", &["p"]);
        fallback.fallback = true;

        let mut registry = ProviderRegistry::new();
        registry.add_image(Arc::new(MockImageProvider::with_outcome(
            "primary",
            ProviderOutcome::Empty,
        )));
        registry.add_image(Arc::new(fallback));

        let resolution = registry.resolve_images("oman", 1).await.unwrap();
        assert!(resolution.degraded);
    }

    #[tokio::test]
    async fn exhausted_chain_is_an_error() {
        let mut registry = ProviderRegistry::new();
        registry.add_image(Arc::new(MockImageProvider::with_outcome(
            "only",
            ProviderOutcome::Failure("down".into()),
        )));

        let result = registry.resolve_images("oman", 1).await;
        assert!(matches!(result, Err(MuninnError::Exhausted)));
    }

    #[tokio::test]
    async fn empty_registry_is_no_provider() {
        let registry = ProviderRegistry::new();
        assert!(matches!(
            registry.resolve_images("oman", 1).await,
            Err(MuninnError::NoProvider)
        ));
        assert!(matches!(
            registry.resolve_posts("oman", 1).await,
            Err(MuninnError::NoProvider)
        ));
    }

    #[tokio::test]
    async fn feed_chain_resolves_in_priority_order() {
        let mut registry = ProviderRegistry::new();
        registry.add_feed(Arc::new(MockFeedProvider {
            name: "feeds",
            outcome: ProviderOutcome::Failure("unreachable".into()),
        }));
        registry.add_feed(Arc::new(MockFeedProvider {
            name: "fallback",
            outcome: ProviderOutcome::Success(vec![FeedPost::new("t", "https://l")]),
        }));

        let resolution = registry.resolve_posts("oman", 1).await.unwrap();
        assert_eq!(resolution.source, "fallback");
        assert_eq!(resolution.items.len(), 1);
    }

    #[test]
    fn provider_names_in_priority_order() {
        let mut registry = ProviderRegistry::new();
        registry.add_image(Arc::new(MockImageProvider::succeeding("first", &["a"])));
        registry.add_image(Arc::new(MockImageProvider::succeeding("second", &["b"])));

        assert_eq!(registry.image_provider_names(), vec!["first", "second"]);
        assert!(registry.has_images());
        assert!(!registry.has_feeds());
    }
}
