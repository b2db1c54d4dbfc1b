//! Request handlers for the HTTP surface.
//!
//! Each handler validates query parameters, checks the per-client rate
//! limit, invokes the gateway (cache first, then the fallback chain), and
//! shapes the JSON response. Provider failures never surface here — the
//! chain guarantees a non-empty result, so the only caller-visible errors
//! are 400 (malformed parameters) and 429 (rate limited).

use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::limiter::{SlidingWindowLimiter, client_key};
use crate::providers::FALLBACK_SOURCE;
use crate::types::{FeedPost, ImageResult};

use super::AppState;
use super::error::ApiError;

/// Default search query when `q` is omitted.
const DEFAULT_QUERY: &str = "Oman";
/// Default image count when `per`/`per_page` is omitted.
const DEFAULT_PER: usize = 5;
/// Largest allowed image count per request.
const MAX_PER: usize = 20;

/// Default topic when `topic`/`subreddit` is omitted.
const DEFAULT_TOPIC: &str = "travel";
/// Default post count when `limit` is omitted.
const DEFAULT_LIMIT: usize = 5;
/// Largest allowed post count per request.
const MAX_LIMIT: usize = 25;

// ============================================================================
// /health
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub ts: u64,
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Json(HealthResponse { ok: true, ts })
}

// ============================================================================
// /images
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ImagesParams {
    pub q: Option<String>,
    pub per: Option<usize>,
    /// Accepted alias for `per`.
    pub per_page: Option<usize>,
}

#[derive(Serialize)]
pub struct ImagesResponse {
    pub query: String,
    pub images: Vec<ImageResult>,
    pub source: String,
    pub count: usize,
    pub cached: bool,
}

/// Image search across the photo provider chain.
pub async fn images(
    State(state): State<AppState>,
    Query(params): Query<ImagesParams>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<ImagesResponse>, ApiError> {
    let query = validated_text(params.q, DEFAULT_QUERY, "q")?;
    let per = validated_count(params.per.or(params.per_page), DEFAULT_PER, MAX_PER, "per")?;

    // Cache before limiter: a replayed request costs no admission budget.
    let response = match state.gateway.cached_images(&query, per) {
        Some(hit) => hit,
        None => {
            check_rate_limit(&state, "images", &headers, connect_info)?;
            state
                .gateway
                .images(&query, per)
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?
        }
    };

    Ok(Json(ImagesResponse {
        query,
        count: response.items.len(),
        images: response.items,
        source: response.source,
        cached: response.cached,
    }))
}

// ============================================================================
// /reddit
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RedditParams {
    pub topic: Option<String>,
    /// Accepted alias for `topic`.
    pub subreddit: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct RedditResponse {
    pub topic: String,
    pub posts: Vec<FeedPost>,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

/// Topic-scoped feed posts across the feed provider chain.
pub async fn reddit(
    State(state): State<AppState>,
    Query(params): Query<RedditParams>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<RedditResponse>, ApiError> {
    let topic = validated_text(params.topic.or(params.subreddit), DEFAULT_TOPIC, "topic")?;
    let limit = validated_count(params.limit, DEFAULT_LIMIT, MAX_LIMIT, "limit")?;

    let response = match state.gateway.cached_posts(&topic, limit) {
        Some(hit) => hit,
        None => {
            check_rate_limit(&state, "reddit", &headers, connect_info)?;
            state
                .gateway
                .posts(&topic, limit)
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?
        }
    };

    let note = (response.source == FALLBACK_SOURCE).then_some("fallback");

    Ok(Json(RedditResponse {
        topic,
        posts: response.items,
        cached: response.cached,
        note,
    }))
}

// ============================================================================
// Shared validation and rate limiting
// ============================================================================

/// Resolve an optional text parameter: absent means the default, present
/// means non-blank.
fn validated_text(
    value: Option<String>,
    default: &str,
    name: &'static str,
) -> Result<String, ApiError> {
    match value {
        None => Ok(default.to_string()),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(ApiError::InvalidParameter(format!(
                    "{name} must not be blank"
                )));
            }
            Ok(trimmed.to_string())
        }
    }
}

/// Resolve an optional count parameter, enforcing `1..=max`.
fn validated_count(
    value: Option<usize>,
    default: usize,
    max: usize,
    name: &'static str,
) -> Result<usize, ApiError> {
    let count = value.unwrap_or(default);
    if count == 0 || count > max {
        return Err(ApiError::InvalidParameter(format!(
            "{name} must be between 1 and {max}"
        )));
    }
    Ok(count)
}

/// Per-endpoint, per-client admission check.
fn check_rate_limit(
    state: &AppState,
    endpoint: &'static str,
    headers: &HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Result<(), ApiError> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    let peer = connect_info.map(|ConnectInfo(addr)| addr.ip().to_string());

    let key = client_key(endpoint, forwarded, peer.as_deref());
    if state.limiter.check_and_record(&key) {
        Ok(())
    } else {
        SlidingWindowLimiter::record_rejection(endpoint);
        Err(ApiError::RateLimited {
            retry_after: state.limiter.window(),
        })
    }
}
