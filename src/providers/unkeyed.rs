//! Unkeyed image source.
//!
//! Synthesizes redirect-based Unsplash Source URLs, one per requested slot.
//! No credential and no upstream round-trip are needed, so this provider
//! never fails — but it cannot guarantee content relevance either, which is
//! why it sits below the keyed providers and is marked as a fallback.

use async_trait::async_trait;

use super::traits::ImageProvider;
use crate::types::{ImageResult, ProviderOutcome};

/// Default base URL for the Unsplash Source redirect service.
const DEFAULT_BASE_URL: &str = "https://source.unsplash.com";

/// Requested image dimensions, path segment of every synthesized URL.
const DIMENSIONS: &str = "800x600";

/// Provider that synthesizes one Unsplash Source URL per slot.
///
/// Each slot gets a distinct `sig` parameter so browsers don't collapse
/// the slots into a single cached redirect target.
#[derive(Clone)]
pub struct UnsplashSource {
    base_url: String,
}

impl UnsplashSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a source with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn slot_url(&self, query: &str, slot: usize) -> String {
        format!(
            "{}/{}/?{}&sig={}",
            self.base_url,
            DIMENSIONS,
            urlencoding::encode(query),
            slot
        )
    }
}

impl Default for UnsplashSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageProvider for UnsplashSource {
    fn name(&self) -> &str {
        "unsplash-source"
    }

    fn is_fallback(&self) -> bool {
        true
    }

    async fn fetch_images(&self, query: &str, count: usize) -> ProviderOutcome<ImageResult> {
        let items = (0..count)
            .map(|slot| ImageResult::bare(self.slot_url(query, slot)))
            .collect();
        ProviderOutcome::from_items(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_exactly_count_entries() {
        let source = UnsplashSource::new();
        let outcome = source.fetch_images("Salalah", 3).await;
        match outcome {
            ProviderOutcome::Success(items) => {
                assert_eq!(items.len(), 3);
                // Slots are distinct URLs.
                assert_ne!(items[0].url, items[1].url);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn query_is_url_encoded() {
        let source = UnsplashSource::new();
        let outcome = source.fetch_images("wadi shab", 1).await;
        let ProviderOutcome::Success(items) = outcome else {
            panic!("expected success");
        };
        assert!(items[0].url.contains("wadi%20shab"));
        assert!(items[0].url.contains("sig=0"));
    }

    #[tokio::test]
    async fn zero_slots_is_empty() {
        let source = UnsplashSource::new();
        assert_eq!(
            source.fetch_images("oman", 0).await,
            ProviderOutcome::Empty
        );
    }
}
