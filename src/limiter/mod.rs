//! Per-client sliding-window rate limiting.
//!
//! [`SlidingWindowLimiter`] keeps one window of admission timestamps per
//! client key. An admission check prunes timestamps older than the window
//! length, admits and records when the remaining count is under budget, and
//! rejects without recording otherwise. Rejection is surfaced to callers as
//! a distinct retryable condition (HTTP 429), never a generic failure.
//!
//! Client keys combine the endpoint name with the caller's network address
//! (see [`client_key`]), so limits are independent per endpoint per client.
//!
//! The limiter is a single-process, in-memory construct. State is shared
//! across concurrently handled requests behind a mutex and lost on restart.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::telemetry;

/// Map size above which empty windows are pruned during a check.
const PRUNE_THRESHOLD: usize = 1_024;

/// Configuration for the sliding-window limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Window length `W`. Default: 60 s.
    pub window: Duration,
    /// Admission budget `N` per window. Default: 60.
    pub max_requests: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 60,
        }
    }
}

impl RateLimitConfig {
    /// Create a new config with the default 60 requests / 60 s window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window length.
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Set the admission budget per window.
    pub fn max_requests(mut self, n: usize) -> Self {
        self.max_requests = n;
        self
    }
}

/// Sliding-window admission counter, one window per client key.
pub struct SlidingWindowLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    window: Duration,
    max_requests: usize,
}

impl SlidingWindowLimiter {
    /// Create a limiter with the given configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window: config.window,
            max_requests: config.max_requests,
        }
    }

    /// Window length this limiter was configured with.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check and record an admission for `key` at the current instant.
    ///
    /// Returns `true` when the request is admitted. A rejected request is
    /// not recorded, so hammering a limited endpoint does not extend the
    /// lockout.
    pub fn check_and_record(&self, key: &str) -> bool {
        self.check_and_record_at(key, Instant::now())
    }

    /// Admission check against an explicit clock instant.
    ///
    /// The public entry point [`check_and_record`](Self::check_and_record)
    /// passes `Instant::now()`; taking the instant as a parameter keeps the
    /// admission logic deterministic under test.
    pub fn check_and_record_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().expect("limiter mutex poisoned");

        // Prune dead windows occasionally so abandoned clients don't
        // accumulate forever.
        if windows.len() > PRUNE_THRESHOLD {
            let horizon = now.checked_sub(self.window);
            windows.retain(|_, w| {
                w.back()
                    .is_some_and(|last| horizon.is_none_or(|h| *last > h))
            });
        }

        let window = windows.entry(key.to_string()).or_default();
        while let Some(oldest) = window.front() {
            if now.duration_since(*oldest) >= self.window {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() < self.max_requests {
            window.push_back(now);
            true
        } else {
            false
        }
    }

    /// Record a rejection metric for `endpoint`.
    ///
    /// Kept separate from the admission check so the limiter itself stays
    /// endpoint-agnostic.
    pub fn record_rejection(endpoint: &'static str) {
        metrics::counter!(telemetry::RATE_LIMITED_TOTAL, "endpoint" => endpoint).increment(1);
    }
}

/// Derive the per-endpoint, per-client limiter key.
///
/// The client identity is the first address in a comma-separated
/// `X-Forwarded-For` header when present (the hop closest to the client),
/// otherwise the socket peer address supplied by the server.
pub fn client_key(endpoint: &str, forwarded_for: Option<&str>, peer: Option<&str>) -> String {
    let client = forwarded_for
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(peer)
        .unwrap_or("unknown");
    format!("{endpoint}:{client}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window_ms: u64, max: usize) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(
            &RateLimitConfig::new()
                .window(Duration::from_millis(window_ms))
                .max_requests(max),
        )
    }

    #[test]
    fn admits_exactly_budget_within_window() {
        let limiter = limiter(60_000, 3);
        let t0 = Instant::now();

        assert!(limiter.check_and_record_at("images:1.2.3.4", t0));
        assert!(limiter.check_and_record_at("images:1.2.3.4", t0 + Duration::from_secs(1)));
        assert!(limiter.check_and_record_at("images:1.2.3.4", t0 + Duration::from_secs(2)));
        // Fourth within the same window is rejected.
        assert!(!limiter.check_and_record_at("images:1.2.3.4", t0 + Duration::from_secs(3)));
    }

    #[test]
    fn window_elapse_resets_admission() {
        let limiter = limiter(60_000, 2);
        let t0 = Instant::now();

        assert!(limiter.check_and_record_at("k", t0));
        assert!(limiter.check_and_record_at("k", t0));
        assert!(!limiter.check_and_record_at("k", t0));

        // Both admissions age out of the window.
        let later = t0 + Duration::from_secs(61);
        assert!(limiter.check_and_record_at("k", later));
    }

    #[test]
    fn rejected_requests_are_not_recorded() {
        let limiter = limiter(60_000, 1);
        let t0 = Instant::now();

        assert!(limiter.check_and_record_at("k", t0));
        // Rejections at t0+30 don't push the lockout past t0+60.
        let mid = t0 + Duration::from_secs(30);
        assert!(!limiter.check_and_record_at("k", mid));
        assert!(!limiter.check_and_record_at("k", mid));

        let after_first = t0 + Duration::from_secs(61);
        assert!(limiter.check_and_record_at("k", after_first));
    }

    #[test]
    fn sliding_window_frees_slots_gradually() {
        let limiter = limiter(10_000, 2);
        let t0 = Instant::now();

        assert!(limiter.check_and_record_at("k", t0));
        assert!(limiter.check_and_record_at("k", t0 + Duration::from_secs(5)));
        assert!(!limiter.check_and_record_at("k", t0 + Duration::from_secs(6)));

        // First admission ages out at t0+10; the second is still in-window.
        let t11 = t0 + Duration::from_secs(11);
        assert!(limiter.check_and_record_at("k", t11));
        assert!(!limiter.check_and_record_at("k", t11));
    }

    #[test]
    fn keys_are_isolated() {
        let limiter = limiter(60_000, 1);
        let t0 = Instant::now();

        assert!(limiter.check_and_record_at("images:a", t0));
        assert!(!limiter.check_and_record_at("images:a", t0));
        // Different client, same endpoint: unaffected.
        assert!(limiter.check_and_record_at("images:b", t0));
        // Same client, different endpoint: unaffected.
        assert!(limiter.check_and_record_at("reddit:a", t0));
    }

    #[test]
    fn client_key_prefers_forwarded_for() {
        let key = client_key("images", Some("203.0.113.9, 10.0.0.1"), Some("10.0.0.2:555"));
        assert_eq!(key, "images:203.0.113.9");
    }

    #[test]
    fn client_key_falls_back_to_peer() {
        assert_eq!(
            client_key("images", None, Some("10.0.0.2:555")),
            "images:10.0.0.2:555"
        );
        assert_eq!(client_key("images", Some("  "), None), "images:unknown");
    }
}
