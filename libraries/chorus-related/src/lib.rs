//! Chorus - Related Content
//!
//! [`RelatedFetcher`](chorus_core::RelatedFetcher) implementation that scrapes
//! a video site's watch page for its "related videos" list. Sessions use it to
//! pick an autoplay follow-up when the queue runs dry.

mod config;
mod extract;
mod fetcher;

// Public exports
pub use config::{RelatedFetcherConfig, DEFAULT_USER_AGENT};
pub use extract::extract_related_links;
pub use fetcher::HttpRelatedFetcher;
