//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::providers::{
    FeedClient, PexelsClient, ProviderRegistry, StaticImages, StaticPosts, UnsplashClient,
    UnsplashSource,
};
use crate::{MuninnError, Result};

use super::ContentGateway;

/// Main entry point for creating gateway instances.
pub struct Muninn;

impl Muninn {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> MuninnBuilder {
        MuninnBuilder::new()
    }
}

/// Builder for configuring gateway instances.
///
/// Keyed providers are registered only when a credential is supplied —
/// a missing key disables that adapter, it never errors. The chains always
/// end in the static fallbacks, so a bare `Muninn::builder().build()` is a
/// working (if entirely synthetic) gateway.
pub struct MuninnBuilder {
    pexels_key: Option<String>,
    unsplash_key: Option<String>,
    default_timeout_secs: Option<u64>,
    cache_config: CacheConfig,
    feed_endpoints: Option<Vec<String>>,
}

impl MuninnBuilder {
    pub fn new() -> Self {
        Self {
            pexels_key: None,
            unsplash_key: None,
            default_timeout_secs: None,
            cache_config: CacheConfig::default(),
            feed_endpoints: None,
        }
    }

    /// Configure the Pexels provider (primary photo search).
    pub fn pexels(mut self, api_key: impl Into<String>) -> Self {
        self.pexels_key = Some(api_key.into());
        self
    }

    /// Configure the Unsplash provider (secondary photo search).
    pub fn unsplash(mut self, access_key: impl Into<String>) -> Self {
        self.unsplash_key = Some(access_key.into());
        self
    }

    /// Set the per-call timeout for all upstream requests (seconds).
    pub fn timeout(mut self, secs: u64) -> Self {
        self.default_timeout_secs = Some(secs);
        self
    }

    /// Configure the response cache.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Override the topic-scoped feed endpoint templates.
    ///
    /// Templates may contain a `{topic}` placeholder; order is priority
    /// order.
    pub fn feed_endpoints(mut self, endpoints: impl IntoIterator<Item = String>) -> Self {
        self.feed_endpoints = Some(endpoints.into_iter().collect());
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<ContentGateway> {
        let timeout_secs = self.default_timeout_secs.unwrap_or(10);

        // One shared HTTP client; the timeout bounds every upstream call so
        // a slow provider cannot block the rest of the chain past it.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MuninnError::Configuration(format!("HTTP client: {e}")))?;

        let mut registry = ProviderRegistry::new();

        // =====================================================================
        // Image chain: keyed providers first, synthetic sources as fallbacks
        // =====================================================================

        if let Some(ref key) = self.pexels_key {
            registry.add_image(Arc::new(PexelsClient::new(key.clone(), http.clone())));
        }

        if let Some(ref key) = self.unsplash_key {
            registry.add_image(Arc::new(UnsplashClient::new(key.clone(), http.clone())));
        }

        registry.add_image(Arc::new(UnsplashSource::new()));
        registry.add_image(Arc::new(StaticImages::new()));

        // =====================================================================
        // Feed chain: live endpoints, then the static safety net
        // =====================================================================

        let feed_client = match self.feed_endpoints {
            Some(endpoints) => FeedClient::with_endpoints(http, endpoints),
            None => FeedClient::new(http),
        };
        registry.add_feed(Arc::new(feed_client));
        registry.add_feed(Arc::new(StaticPosts::new()));

        Ok(ContentGateway::new(registry, &self.cache_config))
    }
}

impl Default for MuninnBuilder {
    fn default() -> Self {
        Self::new()
    }
}
