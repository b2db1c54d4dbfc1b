//! Pexels search API client.
//!
//! Primary keyed photo provider. See: <https://www.pexels.com/api/documentation/>

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::traits::ImageProvider;
use crate::types::{ImageResult, ProviderOutcome};

/// Default base URL for the Pexels API.
const DEFAULT_BASE_URL: &str = "https://api.pexels.com";

/// Client for the Pexels photo search API.
#[derive(Clone)]
pub struct PexelsClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl PexelsClient {
    /// Create a new Pexels client with the given API key and shared HTTP client.
    pub fn new(api_key: impl Into<String>, http: Client) -> Self {
        Self::with_base_url(api_key, http, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        api_key: impl Into<String>,
        http: Client,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into(),
        }
    }

    async fn search(&self, query: &str, count: usize) -> crate::Result<Vec<ImageResult>> {
        let url = format!("{}/v1/search", self.base_url);
        let per_page = count.to_string();

        let response = self
            .http
            .get(&url)
            .header("Authorization", &self.api_key)
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .await
            .map_err(|e| crate::MuninnError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(crate::MuninnError::Api {
                status: status.as_u16(),
                message: format!("Pexels API error: {status}"),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| crate::MuninnError::Http(e.to_string()))?;

        // Best-available URL per photo, preserving upstream ranking. Photos
        // with no usable URL are skipped rather than failing the batch.
        Ok(body
            .photos
            .into_iter()
            .filter_map(|photo| {
                let url = photo.src.best()?;
                Some(match photo.photographer {
                    Some(name) if !name.is_empty() => ImageResult::credited(url, name),
                    _ => ImageResult::bare(url),
                })
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    src: PhotoSrc,
    #[serde(default)]
    photographer: Option<String>,
}

/// Size variants Pexels offers per photo. `large` is preferred; the
/// smaller/original variants are fallbacks when it is absent.
#[derive(Deserialize)]
struct PhotoSrc {
    #[serde(default)]
    large: Option<String>,
    #[serde(default)]
    medium: Option<String>,
    #[serde(default)]
    original: Option<String>,
}

impl PhotoSrc {
    fn best(self) -> Option<String> {
        [self.large, self.medium, self.original]
            .into_iter()
            .flatten()
            .find(|u| !u.is_empty())
    }
}

#[async_trait]
impl ImageProvider for PexelsClient {
    fn name(&self) -> &str {
        "pexels"
    }

    async fn fetch_images(&self, query: &str, count: usize) -> ProviderOutcome<ImageResult> {
        match self.search(query, count).await {
            Ok(items) => ProviderOutcome::from_items(items),
            Err(e) => ProviderOutcome::Failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_src_prefers_large() {
        let src = PhotoSrc {
            large: Some("l".into()),
            medium: Some("m".into()),
            original: Some("o".into()),
        };
        assert_eq!(src.best().as_deref(), Some("l"));
    }

    #[test]
    fn photo_src_falls_back_in_order() {
        let src = PhotoSrc {
            large: None,
            medium: Some("m".into()),
            original: Some("o".into()),
        };
        assert_eq!(src.best().as_deref(), Some("m"));

        let src = PhotoSrc {
            large: None,
            medium: None,
            original: Some("o".into()),
        };
        assert_eq!(src.best().as_deref(), Some("o"));
    }

    #[test]
    fn photo_src_rejects_empty_urls() {
        let src = PhotoSrc {
            large: Some(String::new()),
            medium: None,
            original: None,
        };
        assert!(src.best().is_none());
    }

    #[test]
    fn parse_search_response() {
        let json = r#"{
            "photos": [
                {"src": {"large": "https://img/1-large.jpg", "medium": "https://img/1-med.jpg"},
                 "photographer": "Alia"},
                {"src": {"medium": "https://img/2-med.jpg"}},
                {"src": {}}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.photos.len(), 3);

        let usable: Vec<_> = parsed
            .photos
            .into_iter()
            .filter_map(|p| p.src.best())
            .collect();
        assert_eq!(usable, vec!["https://img/1-large.jpg", "https://img/2-med.jpg"]);
    }
}
