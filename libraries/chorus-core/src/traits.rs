/// Collaborator traits consumed by a listening session
use crate::error::{ExtractionError, FetchError, NotifyError, PlaybackError};
use crate::types::{AudioSource, Notification, PlayableItem, Requester};
use async_trait::async_trait;

/// Turns a URL or search term into a playable item
///
/// Implementations own their network/extraction timeouts; the session treats
/// every failure as an opaque [`ExtractionError`].
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Resolve `query` on behalf of `requester`
    ///
    /// # Errors
    /// Returns an error if the URL is bad, the content is unavailable or the
    /// source is unsupported
    async fn resolve(
        &self,
        query: &str,
        requester: &Requester,
    ) -> Result<PlayableItem, ExtractionError>;
}

/// Produces candidate follow-up URLs for autoplay
///
/// How candidates are obtained (page scraping, an official API, ...) is the
/// implementation's business. The returned list is ordered best-first.
#[async_trait]
pub trait RelatedFetcher: Send + Sync {
    /// Fetch related URLs for the page at `origin_url`
    ///
    /// # Errors
    /// Returns an error if the source is unreachable or its response can't be read
    async fn fetch_related(&self, origin_url: &str) -> Result<Vec<String>, FetchError>;
}

/// Completion callback handed to [`AudioSink::play`]
///
/// Receives `Some(error)` if playback ended abnormally.
pub type Completion = Box<dyn FnOnce(Option<PlaybackError>) + Send + 'static>;

/// Audio output connection (voice channel, device, stream, ...)
///
/// Contract: after `play` returns `Ok`, `on_complete` fires exactly once, when
/// the track ends naturally, when `stop` is called, or when output fails. If
/// `play` returns `Err` the callback is dropped without being called.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Start outputting `source`
    async fn play(&self, source: &AudioSource, on_complete: Completion)
        -> Result<(), PlaybackError>;

    /// Stop the current track; fires the pending completion callback
    fn stop(&self);

    /// Disconnect from the output. Stops any current track first.
    async fn disconnect(&self);

    /// Whether the sink is still connected to its output
    fn is_connected(&self) -> bool;
}

/// Where a session posts messages for its listeners
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;

    /// Best-effort "working on it" indicator before a long operation
    async fn typing(&self) {}
}
