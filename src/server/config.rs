//! Environment-driven configuration for munind.
//!
//! All knobs come from the process environment (the daemon loads a `.env`
//! file first, when present). Provider credentials are optional — an absent
//! key disables that adapter and nothing else. Numeric variables that are
//! present but unparsable are configuration errors at startup rather than
//! silently falling back to defaults.

use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::limiter::RateLimitConfig;
use crate::{MuninnError, Result};

/// Recognized environment variables.
const ENV_PEXELS_KEY: &str = "PEXELS_API_KEY";
const ENV_UNSPLASH_ACCESS_KEY: &str = "UNSPLASH_ACCESS_KEY";
const ENV_UNSPLASH_SECRET_KEY: &str = "UNSPLASH_SECRET_KEY";
const ENV_CACHE_TTL: &str = "CACHE_TTL";
const ENV_RATE_LIMIT_WINDOW: &str = "RATE_LIMIT_WINDOW_SECS";
const ENV_RATE_LIMIT_MAX: &str = "RATE_LIMIT_MAX_REQUESTS";
const ENV_UPSTREAM_TIMEOUT: &str = "UPSTREAM_TIMEOUT_SECS";
const ENV_BIND: &str = "BIND";
const ENV_PORT: &str = "PORT";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind to (default: 0.0.0.0).
    pub bind: String,
    /// Port to listen on (default: 8080, hosting platforms set `PORT`).
    pub port: u16,
    /// Pexels API key; absence disables the primary photo provider.
    pub pexels_api_key: Option<String>,
    /// Unsplash access key; absence disables the secondary photo provider.
    pub unsplash_access_key: Option<String>,
    /// Default response cache TTL (default: 600 s).
    pub cache_ttl: Duration,
    /// Sliding-window rate limit settings (default: 60 requests / 60 s).
    pub rate_limit: RateLimitConfig,
    /// Per-call upstream timeout in seconds (default: 10).
    pub upstream_timeout_secs: u64,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        // Either Unsplash key works; the access key wins when both are set.
        let unsplash_access_key =
            env_opt(ENV_UNSPLASH_ACCESS_KEY).or_else(|| env_opt(ENV_UNSPLASH_SECRET_KEY));

        Ok(Self {
            bind: env_opt(ENV_BIND).unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_parse(ENV_PORT, 8080)?,
            pexels_api_key: env_opt(ENV_PEXELS_KEY),
            unsplash_access_key,
            cache_ttl: Duration::from_secs(env_parse(ENV_CACHE_TTL, 600)?),
            rate_limit: RateLimitConfig::new()
                .window(Duration::from_secs(env_parse(ENV_RATE_LIMIT_WINDOW, 60)?))
                .max_requests(env_parse(ENV_RATE_LIMIT_MAX, 60)?),
            upstream_timeout_secs: env_parse(ENV_UPSTREAM_TIMEOUT, 10)?,
        })
    }

    /// Cache configuration derived from the environment TTL.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new().default_ttl(self.cache_ttl)
    }
}

/// Read an environment variable, treating empty values as absent.
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse an environment variable, with a default for absence.
///
/// A present-but-unparsable value is a configuration error, not a silent
/// fallback.
fn env_parse<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env_opt(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            MuninnError::Configuration(format!("invalid value for {name}: {raw:?}"))
        }),
    }
}
