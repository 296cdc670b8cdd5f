//! Session Events
//!
//! Published on a broadcast channel so front-ends can keep their views in
//! sync without polling. Slow subscribers miss events rather than stalling
//! playback.

use crate::types::{PlayReason, TerminationReason};
use chorus_core::PlayableItem;

/// Events emitted by a session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A track was handed to the sink
    TrackStarted {
        /// The track now playing
        item: PlayableItem,
        /// How it was picked
        reason: PlayReason,
    },

    /// The sink reported the end of a track
    TrackFinished {
        /// The track that ended
        item: PlayableItem,
        /// Set if playback ended abnormally
        error: Option<String>,
    },

    /// Queue changed (tracks added/removed/shuffled/cleared)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Autoplay fallback failed; the session is about to end
    AutoplayFailed {
        /// Error message
        message: String,
    },

    /// The session ended
    Terminated {
        /// Why it ended
        reason: TerminationReason,
    },
}

impl SessionEvent {
    /// Whether this is the last event the session sends
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::Terminated { .. })
    }
}
