//! Syndication feed client for topic-scoped RSS/Atom endpoints.
//!
//! Fetches one or more feed endpoints per topic and extracts `(title, link)`
//! pairs from RSS `<item>` or Atom `<entry>` elements. Endpoints are tried
//! in priority order and failures are isolated per endpoint: a transport
//! error, non-2xx status, or malformed document on one endpoint never aborts
//! the remaining ones. Results are concatenated in endpoint order,
//! de-duplicated by link (first seen wins), and truncated to the requested
//! limit.

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use reqwest::Client;
use tracing::warn;

use super::traits::FeedProvider;
use crate::types::{FeedPost, ProviderOutcome};
use crate::{MuninnError, Result};

/// Default topic-scoped endpoints, highest priority first. Reddit serves
/// Atom from its `.rss` URLs.
const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://www.reddit.com/r/{topic}/.rss",
    "https://www.reddit.com/r/{topic}/top/.rss",
];

/// User agent sent with every feed request; reddit rejects the default one.
const USER_AGENT: &str = concat!("muninn/", env!("CARGO_PKG_VERSION"));

/// Client fetching and parsing topic-scoped syndication feeds.
#[derive(Clone)]
pub struct FeedClient {
    http: Client,
    /// Endpoint URL templates containing a `{topic}` placeholder.
    endpoints: Vec<String>,
}

impl FeedClient {
    /// Create a feed client over the default endpoints.
    pub fn new(http: Client) -> Self {
        Self::with_endpoints(http, DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()))
    }

    /// Create a feed client over custom endpoint templates (for testing and
    /// alternative feed sources). Templates may contain `{topic}`.
    pub fn with_endpoints(http: Client, endpoints: impl IntoIterator<Item = String>) -> Self {
        Self {
            http,
            endpoints: endpoints.into_iter().collect(),
        }
    }

    async fn fetch_endpoint(&self, url: &str) -> Result<Vec<FeedPost>> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MuninnError::Api {
                status: status.as_u16(),
                message: format!("feed endpoint error: {status}"),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        parse_feed(&body)
    }
}

#[async_trait]
impl FeedProvider for FeedClient {
    fn name(&self) -> &str {
        "feeds"
    }

    async fn fetch_posts(&self, topic: &str, limit: usize) -> ProviderOutcome<FeedPost> {
        let topic_segment = urlencoding::encode(topic).into_owned();

        let mut posts: Vec<FeedPost> = Vec::new();
        let mut failures = 0usize;

        for template in &self.endpoints {
            let url = template.replace("{topic}", &topic_segment);
            match self.fetch_endpoint(&url).await {
                Ok(batch) => {
                    for post in batch {
                        // De-duplicate by link across endpoints, first seen wins.
                        if !posts.iter().any(|p| p.link == post.link) {
                            posts.push(post);
                        }
                    }
                }
                Err(e) => {
                    warn!(endpoint = %url, error = %e, "feed endpoint failed");
                    failures += 1;
                }
            }
            if posts.len() >= limit {
                break;
            }
        }

        if posts.is_empty() && failures == self.endpoints.len() && failures > 0 {
            return ProviderOutcome::Failure("all feed endpoints failed".to_string());
        }

        posts.truncate(limit);
        ProviderOutcome::from_items(posts)
    }
}

/// Which text node is currently being captured inside an entry.
enum Capture {
    Title,
    Link,
}

/// Extract `(title, link)` pairs from an RSS or Atom document.
///
/// RSS carries the link as element text (`<link>https://…</link>`); Atom
/// carries it as an attribute (`<link href="https://…"/>`). When a link
/// element has both, the text wins only if the href was not seen first —
/// within one entry the first usable link is kept.
pub(crate) fn parse_feed(xml: &str) -> Result<Vec<FeedPost>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut posts = Vec::new();
    let mut in_entry = false;
    let mut title: Option<String> = None;
    let mut link: Option<String> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(MuninnError::Feed(e.to_string())),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    in_entry = true;
                    title = None;
                    link = None;
                }
                b"title" if in_entry => capture = Some(Capture::Title),
                b"link" if in_entry => {
                    if let Some(href) = href_attribute(&e) {
                        link.get_or_insert(href);
                    } else {
                        capture = Some(Capture::Link);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if in_entry
                    && e.local_name().as_ref() == b"link"
                    && let Some(href) = href_attribute(&e)
                {
                    link.get_or_insert(href);
                }
            }
            Ok(Event::Text(t)) => {
                if in_entry && let Some(field) = &capture {
                    let text = t.unescape().unwrap_or_default().trim().to_string();
                    if !text.is_empty() {
                        match field {
                            Capture::Title => title.get_or_insert(text),
                            Capture::Link => link.get_or_insert(text),
                        };
                    }
                }
            }
            Ok(Event::CData(t)) => {
                if in_entry && let Some(field) = &capture {
                    let text = String::from_utf8_lossy(&t.into_inner()).trim().to_string();
                    if !text.is_empty() {
                        match field {
                            Capture::Title => title.get_or_insert(text),
                            Capture::Link => link.get_or_insert(text),
                        };
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    if let (Some(title), Some(link)) = (title.take(), link.take()) {
                        posts.push(FeedPost::new(title, link));
                    }
                    in_entry = false;
                    capture = None;
                }
                b"title" | b"link" => capture = None,
                _ => {}
            },
            Ok(_) => {}
        }
    }

    Ok(posts)
}

/// Read the `href` attribute from a feed `<link>` element, if any.
fn href_attribute(element: &BytesStart<'_>) -> Option<String> {
    element
        .try_get_attribute("href")
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}
