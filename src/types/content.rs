//! Normalized content shapes produced by provider adapters.

use serde::{Deserialize, Serialize};

/// A single image returned by a photo provider.
///
/// Order within a result sequence reflects upstream ranking and is
/// never reordered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

impl ImageResult {
    /// Image with no attribution (synthesized/placeholder sources).
    pub fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            attribution: None,
        }
    }

    /// Image credited to an upstream author.
    pub fn credited(url: impl Into<String>, attribution: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            attribution: Some(attribution.into()),
        }
    }
}

/// A single post extracted from a syndication feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPost {
    pub title: String,
    pub link: String,
}

impl FeedPost {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}
