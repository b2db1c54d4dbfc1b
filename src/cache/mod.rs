//! Response cache keyed by request signature.
//!
//! [`ResponseCache`] stores resolved responses for the `/images` and
//! `/reddit` endpoints so repeated identical requests are served without
//! touching upstreams. Entries carry their own time-to-live: a normal
//! resolution is kept for the configured default TTL, while a degraded
//! (fallback-sourced) resolution is kept for a much shorter window so the
//! real upstreams are retried sooner.
//!
//! # Architecture
//!
//! The cache sits in [`ContentGateway`](crate::ContentGateway), above the
//! [`ProviderRegistry`](crate::providers::ProviderRegistry) fallback chain.
//! A cache hit bypasses provider selection entirely. Hit/miss metrics are
//! emitted per endpoint.
//!
//! Expiry is lazy — moka drops an expired entry on the lookup that finds it
//! stale; there is no background sweep. `insert` unconditionally overwrites
//! any existing entry for the same key.
//!
//! # Keys
//!
//! Keys are the stable serialization of the logical request: endpoint name
//! plus normalized query parameters (see [`request_key`]). The same logical
//! request always produces the same key, so repeated calls hit the cache.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;

use crate::telemetry;
use crate::types::{FeedPost, ImageResult, Resolution};

/// Configuration for the response cache.
///
/// ```rust
/// # use muninn::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .default_ttl(Duration::from_secs(600))
///     .degraded_ttl(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live for resolutions served by a real upstream. Default: 600 s.
    pub default_ttl: Duration,
    /// Time-to-live for degraded (fallback-sourced) resolutions. Default: 60 s.
    pub degraded_ttl: Duration,
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(600),
            degraded_ttl: Duration::from_secs(60),
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time-to-live for upstream-sourced entries.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the time-to-live for degraded (fallback-sourced) entries.
    pub fn degraded_ttl(mut self, ttl: Duration) -> Self {
        self.degraded_ttl = ttl;
        self
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }
}

/// Cached response value — either an image or a feed resolution.
#[derive(Clone, Debug)]
pub(crate) enum CachedResponse {
    Images(Resolution<ImageResult>),
    Posts(Resolution<FeedPost>),
}

/// Cache entry carrying its own time-to-live.
#[derive(Clone, Debug)]
struct CachedEntry {
    value: CachedResponse,
    ttl: Duration,
}

/// Per-entry expiry policy reading the TTL stored in the entry itself.
struct PerEntryTtl;

impl Expiry<String, CachedEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory response cache with per-entry TTL.
///
/// Uses moka's sync LRU cache. See module docs for key design and expiry
/// semantics.
pub struct ResponseCache {
    cache: Cache<String, CachedEntry>,
    default_ttl: Duration,
    degraded_ttl: Duration,
}

impl ResponseCache {
    /// Create a new response cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self {
            cache,
            default_ttl: config.default_ttl,
            degraded_ttl: config.degraded_ttl,
        }
    }

    /// TTL to apply to a resolution, based on its degraded flag.
    pub fn ttl_for(&self, degraded: bool) -> Duration {
        if degraded {
            self.degraded_ttl
        } else {
            self.default_ttl
        }
    }

    /// Look up a cached image resolution.
    ///
    /// Returns `None` on miss or expiry. Emits hit/miss metrics.
    pub(crate) fn get_images(&self, key: &str) -> Option<Resolution<ImageResult>> {
        match self.cache.get(key) {
            Some(CachedEntry {
                value: CachedResponse::Images(r),
                ..
            }) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "endpoint" => "images").increment(1);
                Some(r)
            }
            _ => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "endpoint" => "images")
                    .increment(1);
                None
            }
        }
    }

    /// Insert an image resolution, overwriting any entry under `key`.
    pub(crate) fn insert_images(&self, key: String, value: Resolution<ImageResult>, ttl: Duration) {
        self.cache.insert(
            key,
            CachedEntry {
                value: CachedResponse::Images(value),
                ttl,
            },
        );
    }

    /// Look up a cached feed resolution.
    ///
    /// Returns `None` on miss or expiry. Emits hit/miss metrics.
    pub(crate) fn get_posts(&self, key: &str) -> Option<Resolution<FeedPost>> {
        match self.cache.get(key) {
            Some(CachedEntry {
                value: CachedResponse::Posts(r),
                ..
            }) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "endpoint" => "reddit").increment(1);
                Some(r)
            }
            _ => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "endpoint" => "reddit")
                    .increment(1);
                None
            }
        }
    }

    /// Insert a feed resolution, overwriting any entry under `key`.
    pub(crate) fn insert_posts(&self, key: String, value: Resolution<FeedPost>, ttl: Duration) {
        self.cache.insert(
            key,
            CachedEntry {
                value: CachedResponse::Posts(value),
                ttl,
            },
        );
    }

    /// Number of entries currently in the cache.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute the stable cache key for a logical request.
///
/// The key is `endpoint?k1=v1&k2=v2` with parameter values trimmed and
/// lowercased. Callers pass parameters in a fixed order, so the same
/// logical request always serializes to the same key. This stays
/// human-readable (useful in logs) rather than hashed — the keyspace is
/// tiny and bounded by the cache capacity anyway.
pub fn request_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    let mut key = String::from(endpoint);
    for (i, (name, value)) in params.iter().enumerate() {
        key.push(if i == 0 { '?' } else { '&' });
        key.push_str(name);
        key.push('=');
        key.push_str(&value.trim().to_lowercase());
    }
    key
}
