//! Caller-visible error responses.
//!
//! Adapter and upstream failures never reach this type — they are absorbed
//! by the fallback chain. The only conditions a caller can observe are
//! rate limiting, malformed request parameters, and (defensively) an
//! internal error from an exhausted chain. Each is serialized as JSON with
//! a stable `error` code and a matching HTTP status.

use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Errors surfaced to HTTP callers.
#[derive(Debug)]
pub enum ApiError {
    /// Client exceeded the sliding-window budget. Retryable after the
    /// window drains; the hint is sent as a `Retry-After` header.
    RateLimited { retry_after: Duration },
    /// A query parameter was malformed or out of range.
    InvalidParameter(String),
    /// Defensive catch-all; reaching it indicates a misconfigured chain.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                format!(
                    "request budget exceeded; retry in up to {} seconds",
                    retry_after.as_secs()
                ),
            ),
            ApiError::InvalidParameter(message) => (
                StatusCode::BAD_REQUEST,
                "invalid_parameter",
                message.clone(),
            ),
            ApiError::Internal(message) => {
                tracing::error!(%message, "internal error reached the HTTP surface");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal error".to_string(),
                )
            }
        };

        let mut response = (status, Json(ErrorBody { error: code, message })).into_response();

        if let ApiError::RateLimited { retry_after } = self
            && let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }

        response
    }
}
