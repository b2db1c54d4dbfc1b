//! Muninn - aggregation gateway for third-party content APIs
//!
//! This crate fronts several third-party content providers (stock-photo
//! search, a secondary photo API, topic-scoped syndication feeds) behind a
//! small set of stable endpoints, so a client application needs no
//! per-provider API keys, rate-limit handling, or response normalization.
//!
//! The core is the request-resolution pipeline: an ordered,
//! short-circuiting fallback chain across upstream providers, a TTL cache
//! keyed by request signature, and a per-client sliding-window rate
//! limiter. Each chain ends in a static provider that cannot fail, so a
//! resolution always produces a non-empty result.
//!
//! # Example
//!
//! ```rust,no_run
//! use muninn::Muninn;
//!
//! #[tokio::main]
//! async fn main() -> muninn::Result<()> {
//!     let gateway = Muninn::builder()
//!         .pexels("your-pexels-key")
//!         .build()?;
//!
//!     let response = gateway.images("Salalah", 3).await?;
//!     println!("{} images via {}", response.items.len(), response.source);
//!     Ok(())
//! }
//! ```
//!
//! The `munind` binary wraps the gateway in an HTTP server with `/health`,
//! `/images`, and `/reddit` endpoints; see [`server`].

pub mod cache;
pub mod error;
pub mod gateway;
pub mod limiter;
pub mod providers;
pub mod server;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::CacheConfig;
pub use error::{MuninnError, Result};
pub use gateway::{ContentGateway, GatewayResponse, Muninn, MuninnBuilder};
pub use limiter::{RateLimitConfig, SlidingWindowLimiter};

// Re-export content types
pub use types::{FeedPost, ImageResult, ProviderOutcome, Resolution};
