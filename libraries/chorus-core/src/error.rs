//! Error types reported by session collaborators
use thiserror::Error;

/// The source resolver could not turn a URL or search term into a playable item
///
/// Covers bad URLs, unavailable content and unsupported sources alike; the
/// session does not distinguish between them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Couldn't extract `{query}`: {reason}")]
pub struct ExtractionError {
    /// URL or search term that was being resolved
    pub query: String,
    /// Resolver-provided reason
    pub reason: String,
}

impl ExtractionError {
    /// Create an extraction error for a query
    pub fn new(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            reason: reason.into(),
        }
    }
}

/// The recommendation source was unreachable or returned unusable data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, ...)
    #[error("Request failed: {0}")]
    Request(String),

    /// Non-success HTTP status
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// Origin URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Response body could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Create a request error
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// The audio sink failed while starting or outputting a track
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Sink reported a failure
    #[error("Audio sink error: {0}")]
    Sink(String),

    /// Sink is not connected to an output
    #[error("Audio sink is not connected")]
    NotConnected,
}

impl PlaybackError {
    /// Create a sink error
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}

/// A notification could not be delivered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);
