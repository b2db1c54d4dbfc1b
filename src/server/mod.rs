//! HTTP surface for the aggregation gateway.
//!
//! Thin glue over the library: a router with three GET endpoints
//! (`/health`, `/images`, `/reddit`), explicit shared state, and a
//! permissive CORS layer. All behaviour of substance lives in the
//! gateway, cache, limiter, and provider modules.

pub mod config;
mod error;
mod handlers;

pub use config::Config;
pub use error::ApiError;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::gateway::ContentGateway;
use crate::limiter::SlidingWindowLimiter;

/// Shared state for the HTTP surface.
///
/// Created once at process start and cloned into handlers; tests build
/// isolated instances per test.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ContentGateway>,
    pub limiter: Arc<SlidingWindowLimiter>,
}

/// Assemble the router over the given state.
///
/// Cross-origin access is permitted from any origin — restricting it is an
/// operational concern for a fronting proxy, not gateway behaviour.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/images", get(handlers::images))
        .route("/reddit", get(handlers::reddit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::cache::CacheConfig;
    use crate::gateway::Muninn;
    use crate::limiter::{RateLimitConfig, SlidingWindowLimiter};

    /// App over a bare gateway (no credentials): the image chain starts at
    /// the unkeyed source and the feed chain points at a closed local port,
    /// so no test touches the network.
    fn test_app(limit: usize) -> Router {
        let gateway = Muninn::builder()
            .cache(CacheConfig::new())
            .feed_endpoints(vec!["http://127.0.0.1:1/{topic}".to_string()])
            .build()
            .unwrap();
        let state = AppState {
            gateway: Arc::new(gateway),
            limiter: Arc::new(SlidingWindowLimiter::new(
                &RateLimitConfig::new().max_requests(limit),
            )),
        };
        create_router(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_app(10);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert!(json["ts"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn images_defaults_apply() {
        let app = test_app(10);
        let response = app
            .oneshot(Request::builder().uri("/images").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["query"], "Oman");
        assert_eq!(json["count"], 5);
        assert_eq!(json["images"].as_array().unwrap().len(), 5);
        assert_eq!(json["source"], "unsplash-source");
        assert_eq!(json["cached"], false);
    }

    #[tokio::test]
    async fn images_rejects_out_of_range_per() {
        let app = test_app(10);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/images?per=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_parameter");
    }

    #[tokio::test]
    async fn images_rejects_blank_query() {
        let app = test_app(10);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/images?q=%20%20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rate_limit_rejects_after_budget() {
        let app = test_app(2);

        // Distinct queries so each request is a fresh resolution.
        for uri in ["/images?q=muscat", "/images?q=nizwa"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/images?q=sur")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
        let json = body_json(response).await;
        assert_eq!(json["error"], "rate_limited");
    }

    /// A cached replay is served even after the budget is exhausted —
    /// it costs the upstreams nothing.
    #[tokio::test]
    async fn cached_replay_bypasses_the_limiter() {
        let app = test_app(1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/images?q=muscat")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Budget is now exhausted, but the replay hits the cache.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/images?q=muscat")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["cached"], true);

        // A fresh resolution is still rejected.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/images?q=nizwa")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn rate_limit_is_per_endpoint() {
        let app = test_app(1);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/images").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Same client, other endpoint: separate budget.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/reddit?limit=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn forwarded_clients_have_separate_budgets() {
        let app = test_app(1);

        // First client spends its budget and is rejected on a fresh query.
        for (uri, expected) in [
            ("/images?q=muscat", StatusCode::OK),
            ("/images?q=nizwa", StatusCode::TOO_MANY_REQUESTS),
        ] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri(uri)
                        .header("x-forwarded-for", "203.0.113.1")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "{uri}");
        }

        // A different forwarded client has an untouched budget.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/images?q=salalah")
                    .header("x-forwarded-for", "203.0.113.2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
