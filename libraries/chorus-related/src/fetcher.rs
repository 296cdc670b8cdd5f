//! HTTP related-content fetcher

use crate::config::{parse_http_url, RelatedFetcherConfig};
use crate::extract::extract_related_links;
use async_trait::async_trait;
use chorus_core::{FetchError, RelatedFetcher};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Fetches a track's watch page and scrapes its related videos
///
/// # Example
///
/// ```ignore
/// use chorus_related::{HttpRelatedFetcher, RelatedFetcherConfig};
///
/// let fetcher = HttpRelatedFetcher::new(RelatedFetcherConfig::default())?;
/// let related = fetcher.fetch_related("https://www.youtube.com/watch?v=abc").await?;
/// ```
pub struct HttpRelatedFetcher {
    http: Client,
    base: Option<Url>,
}

impl HttpRelatedFetcher {
    /// Create a fetcher with the given configuration
    pub fn new(config: RelatedFetcherConfig) -> Result<Self, FetchError> {
        let base = config
            .base_url
            .as_deref()
            .map(parse_http_url)
            .transpose()?;

        let http = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::request(e.to_string()))?;

        Ok(Self { http, base })
    }
}

#[async_trait]
impl RelatedFetcher for HttpRelatedFetcher {
    async fn fetch_related(&self, origin_url: &str) -> Result<Vec<String>, FetchError> {
        let origin = parse_http_url(origin_url)?;
        debug!("Fetching related content for {}", origin);

        let response = self
            .http
            .get(origin.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Related content request for {} returned {}", origin, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let page = response
            .text()
            .await
            .map_err(|e| FetchError::parse(format!("Unreadable page body: {e}")))?;

        let base = self.base.as_ref().unwrap_or(&origin);
        let links = extract_related_links(&page, base);
        debug!("Found {} related links on {}", links.len(), origin);

        Ok(links)
    }
}

fn request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::request(format!("Timed out: {e}"))
    } else {
        FetchError::request(e.to_string())
    }
}
