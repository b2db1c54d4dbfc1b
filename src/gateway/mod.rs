//! Gateway assembly: builder plus the cache-fronted resolution entry points.

mod builder;

pub use builder::{Muninn, MuninnBuilder};

use crate::cache::{CacheConfig, ResponseCache, request_key};
use crate::providers::ProviderRegistry;
use crate::types::{FeedPost, ImageResult};
use crate::Result;

/// A resolved request as served to a handler.
///
/// `cached` distinguishes a fresh resolution from a replay; `source` and
/// `degraded` are carried through from the winning provider either way.
#[derive(Debug, Clone)]
pub struct GatewayResponse<T> {
    pub items: Vec<T>,
    pub source: String,
    pub degraded: bool,
    pub cached: bool,
}

/// Cache-fronted content gateway.
///
/// Owns the provider registry and the response cache. Created once at
/// process start (via [`Muninn::builder`]) and shared behind an `Arc` for
/// the process lifetime; tests instantiate isolated instances per test.
///
/// The cache sits above the fallback chain: a hit bypasses provider
/// selection entirely. Fresh resolutions are stored with the default TTL,
/// or the shorter degraded TTL when a fallback source produced them, so
/// real upstreams are retried sooner.
pub struct ContentGateway {
    registry: ProviderRegistry,
    cache: ResponseCache,
}

impl ContentGateway {
    /// Create a gateway over an assembled registry.
    ///
    /// Most callers should use [`Muninn::builder`]; this constructor exists
    /// so tests can inject hand-built chains.
    pub fn new(registry: ProviderRegistry, cache_config: &CacheConfig) -> Self {
        Self {
            registry,
            cache: ResponseCache::new(cache_config),
        }
    }

    /// Probe the cache for an image request without touching the chain.
    ///
    /// Handlers call this before the rate limiter so replays of a cached
    /// request cost the client no admission budget (and the upstreams
    /// nothing at all).
    pub fn cached_images(&self, query: &str, count: usize) -> Option<GatewayResponse<ImageResult>> {
        let key = request_key("images", &[("q", query.trim()), ("per", &count.to_string())]);
        self.cache.get_images(&key).map(|hit| GatewayResponse {
            items: hit.items,
            source: hit.source,
            degraded: hit.degraded,
            cached: true,
        })
    }

    /// Probe the cache for a feed request without touching the chain.
    pub fn cached_posts(&self, topic: &str, limit: usize) -> Option<GatewayResponse<FeedPost>> {
        let key = request_key("reddit", &[("topic", topic.trim()), ("limit", &limit.to_string())]);
        self.cache.get_posts(&key).map(|hit| GatewayResponse {
            items: hit.items,
            source: hit.source,
            degraded: hit.degraded,
            cached: true,
        })
    }

    /// Resolve an image request, consulting the cache first.
    pub async fn images(&self, query: &str, count: usize) -> Result<GatewayResponse<ImageResult>> {
        let query = query.trim();
        let key = request_key("images", &[("q", query), ("per", &count.to_string())]);

        if let Some(hit) = self.cache.get_images(&key) {
            return Ok(GatewayResponse {
                items: hit.items,
                source: hit.source,
                degraded: hit.degraded,
                cached: true,
            });
        }

        let resolution = self.registry.resolve_images(query, count).await?;
        let ttl = self.cache.ttl_for(resolution.degraded);
        self.cache.insert_images(key, resolution.clone(), ttl);

        Ok(GatewayResponse {
            items: resolution.items,
            source: resolution.source,
            degraded: resolution.degraded,
            cached: false,
        })
    }

    /// Resolve a feed request, consulting the cache first.
    pub async fn posts(&self, topic: &str, limit: usize) -> Result<GatewayResponse<FeedPost>> {
        let topic = topic.trim();
        let key = request_key("reddit", &[("topic", topic), ("limit", &limit.to_string())]);

        if let Some(hit) = self.cache.get_posts(&key) {
            return Ok(GatewayResponse {
                items: hit.items,
                source: hit.source,
                degraded: hit.degraded,
                cached: true,
            });
        }

        let resolution = self.registry.resolve_posts(topic, limit).await?;
        let ttl = self.cache.ttl_for(resolution.degraded);
        self.cache.insert_posts(key, resolution.clone(), ttl);

        Ok(GatewayResponse {
            items: resolution.items,
            source: resolution.source,
            degraded: resolution.degraded,
            cached: false,
        })
    }

    /// The registry backing this gateway (introspection for logs/tests).
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}
