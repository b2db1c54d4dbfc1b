//! Unsplash search API client.
//!
//! Secondary keyed photo provider, tried when Pexels is disabled or comes
//! back empty. See: <https://unsplash.com/documentation#search-photos>

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::traits::ImageProvider;
use crate::types::{ImageResult, ProviderOutcome};

/// Default base URL for the Unsplash API.
const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// Client for the Unsplash photo search API.
#[derive(Clone)]
pub struct UnsplashClient {
    access_key: String,
    http: Client,
    base_url: String,
}

impl UnsplashClient {
    /// Create a new Unsplash client with the given access key and shared HTTP client.
    pub fn new(access_key: impl Into<String>, http: Client) -> Self {
        Self::with_base_url(access_key, http, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        access_key: impl Into<String>,
        http: Client,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            http,
            base_url: base_url.into(),
        }
    }

    async fn search(&self, query: &str, count: usize) -> crate::Result<Vec<ImageResult>> {
        let url = format!("{}/search/photos", self.base_url);
        let per_page = count.to_string();

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .await
            .map_err(|e| crate::MuninnError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(crate::MuninnError::Api {
                status: status.as_u16(),
                message: format!("Unsplash API error: {status}"),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| crate::MuninnError::Http(e.to_string()))?;

        Ok(body
            .results
            .into_iter()
            .filter_map(|result| {
                let url = result.urls.best()?;
                Some(match result.user.and_then(|u| u.name) {
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
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    urls: PhotoUrls,
    #[serde(default)]
    user: Option<User>,
}

/// Size variants Unsplash offers per photo. `regular` is preferred; `full`
/// and `small` are fallbacks when it is absent.
#[derive(Deserialize)]
struct PhotoUrls {
    #[serde(default)]
    regular: Option<String>,
    #[serde(default)]
    full: Option<String>,
    #[serde(default)]
    small: Option<String>,
}

impl PhotoUrls {
    fn best(self) -> Option<String> {
        [self.regular, self.full, self.small]
            .into_iter()
            .flatten()
            .find(|u| !u.is_empty())
    }
}

#[derive(Deserialize)]
struct User {
    #[serde(default)]
    name: Option<String>,
}

#[async_trait]
impl ImageProvider for UnsplashClient {
    fn name(&self) -> &str {
        "unsplash"
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
    fn photo_urls_prefer_regular() {
        let urls = PhotoUrls {
            regular: Some("r".into()),
            full: Some("f".into()),
            small: Some("s".into()),
        };
        assert_eq!(urls.best().as_deref(), Some("r"));
    }

    #[test]
    fn photo_urls_fall_back_in_order() {
        let urls = PhotoUrls {
            regular: None,
            full: Some("f".into()),
            small: Some("s".into()),
        };
        assert_eq!(urls.best().as_deref(), Some("f"));
    }

    #[test]
    fn parse_search_response_with_attribution() {
        let json = r#"{
            "results": [
                {"urls": {"regular": "https://img/1.jpg"}, "user": {"name": "Noor"}},
                {"urls": {"small": "https://img/2.jpg"}, "user": {}},
                {"urls": {}}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 3);

        let first = &parsed.results[0];
        assert_eq!(
            first.user.as_ref().and_then(|u| u.name.as_deref()),
            Some("Noor")
        );
    }
}
