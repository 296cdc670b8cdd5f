//! Related fetcher configuration

use chorus_core::FetchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Crawler user agent; the watch page is only served in full to crawlers
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Bingbot/2.0; +http://www.bing.com/bingbot.htm)";

/// Settings for [`HttpRelatedFetcher`](crate::HttpRelatedFetcher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedFetcherConfig {
    /// User agent sent with every page request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Base URL relative links are resolved against (defaults to the origin page)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl RelatedFetcherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Resolve relative links against `base_url` instead of the origin page
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl Default for RelatedFetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            base_url: None,
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_connect_timeout_secs() -> u64 {
    5
}

/// Parse an absolute http(s) URL
pub(crate) fn parse_http_url(raw: &str) -> Result<url::Url, FetchError> {
    let url = url::Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl(format!(
            "{raw}: unsupported scheme `{other}`"
        ))),
    }
}
