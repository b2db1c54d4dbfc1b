//! Telemetry metric name constants.
//!
//! Centralised metric names for muninn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `muninn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider` — provider tag (e.g. "pexels", "feeds", "fallback")
//! - `operation` — resolution invoked ("images" | "posts")
//! - `status` — outcome: "ok" or "error"
//! - `endpoint` — HTTP endpoint name ("images" | "reddit")

/// Total provider fetches dispatched through the registry.
///
/// Labels: `provider`, `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "muninn_requests_total";

/// Resolution duration in seconds, measured from the start of the chain.
///
/// Labels: `provider`, `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "muninn_request_duration_seconds";

/// Total response cache hits.
///
/// Labels: `endpoint`.
pub const CACHE_HITS_TOTAL: &str = "muninn_cache_hits_total";

/// Total response cache misses.
///
/// Labels: `endpoint`.
pub const CACHE_MISSES_TOTAL: &str = "muninn_cache_misses_total";

/// Total requests rejected by the sliding-window rate limiter.
///
/// Labels: `endpoint`.
pub const RATE_LIMITED_TOTAL: &str = "muninn_rate_limited_total";

/// Total resolutions that exhausted the provider chain.
///
/// The static fallback never fails, so a non-zero value indicates a
/// misconfigured chain.
///
/// Labels: `operation`.
pub const FALLBACK_EXHAUSTED_TOTAL: &str = "muninn_fallback_exhausted_total";
