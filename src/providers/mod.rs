//! Upstream provider adapters and the fallback registry.

pub mod fallback;
pub mod feeds;
pub mod pexels;
pub mod registry;
pub mod traits;
pub mod unkeyed;
pub mod unsplash;

pub use fallback::{FALLBACK_SOURCE, StaticImages, StaticPosts};
pub use feeds::FeedClient;
pub use pexels::PexelsClient;
pub use registry::ProviderRegistry;
pub use traits::{FeedProvider, ImageProvider};
pub use unkeyed::UnsplashSource;
pub use unsplash::UnsplashClient;
