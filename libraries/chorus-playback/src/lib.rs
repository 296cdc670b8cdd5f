//! Chorus - Listening Sessions
//!
//! Per-context playback orchestration for shared listening.
//!
//! This crate provides:
//! - FIFO playback queue with blocking, timed dequeue
//! - Play history and autoplay candidate selection
//! - Session state machine (loop mode, autoplay fallback, idle teardown)
//! - Skip votes
//! - Session registry (one live session per context)
//!
//! # Architecture
//!
//! Each [`Session`] runs one background task that picks the next track and
//! hands it to an [`AudioSink`](chorus_core::AudioSink). Resolving queries,
//! fetching related content and talking to listeners all go through the
//! collaborator traits in `chorus-core`, so the crate has no idea which media
//! site, voice transport or chat platform sits on either side.
//!
//! # Example
//!
//! ```rust,no_run
//! use chorus_core::{ContextId, Requester};
//! use chorus_playback::{SessionConfig, SessionRegistry};
//! # use chorus_core::{AudioSink, Notifier, RelatedFetcher, SourceResolver};
//! # use std::sync::Arc;
//! # async fn run(
//! #     resolver: Arc<dyn SourceResolver>,
//! #     fetcher: Arc<dyn RelatedFetcher>,
//! #     sink: Arc<dyn AudioSink>,
//! #     notifier: Arc<dyn Notifier>,
//! # ) -> chorus_playback::Result<()> {
//! let registry = SessionRegistry::new(SessionConfig::load()?, resolver, fetcher);
//!
//! let context = ContextId::new("guild-1");
//! let session = registry.get_or_start(&context, sink, notifier).await?;
//!
//! let requester = Requester::new("42", "alice");
//! session.request("lofi beats", &requester).await?;
//!
//! // Later
//! registry.stop(&context).await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod events;
mod history;
mod queue;
mod registry;
mod selector;
mod session;
pub mod types;

// Public exports
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use events::SessionEvent;
pub use history::History;
pub use queue::{PlaybackQueue, QueueTimeout};
pub use registry::SessionRegistry;
pub use selector::{RecommendationSelector, DEFAULT_HISTORY_WINDOW};
pub use session::{Collaborators, Session};
pub use types::{PlayReason, SessionPhase, SessionSettings, TerminationReason};
