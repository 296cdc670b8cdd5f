//! Chorus Core
//!
//! Core types, collaborator traits and error handling for Chorus listening
//! sessions.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `PlayableItem`, `AudioSource`, `TrackInfo`, `Requester`
//! - **Collaborator Traits**: `SourceResolver`, `RelatedFetcher`, `AudioSink`, `Notifier`
//! - **Error Handling**: one error type per collaborator contract
//!
//! The playback state machine itself lives in `chorus-playback`; everything it
//! talks to outside the process is reached through the traits defined here.
//!
//! # Example
//!
//! ```rust
//! use chorus_core::{PlayableItem, Requester, TrackInfo};
//! use std::time::Duration;
//!
//! let requester = Requester::new("42", "alice");
//! let info = TrackInfo::new(
//!     "Song Title",
//!     "https://video.example/watch?v=abc",
//!     "https://cdn.example/abc.webm",
//! )
//! .with_duration(Duration::from_secs(215))
//! .with_uploader("Uploader", "https://video.example/channel/xyz");
//!
//! let item = PlayableItem::new(info, requester);
//! assert_eq!(item.origin_url(), "https://video.example/watch?v=abc");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ExtractionError, FetchError, NotifyError, PlaybackError};
pub use traits::{AudioSink, Completion, Notifier, RelatedFetcher, SourceResolver};
pub use types::{
    AudioSource, ContextId, ItemId, Notification, NowPlaying, PlayableItem, Requester,
    RequesterId, SessionId, TrackInfo,
};
