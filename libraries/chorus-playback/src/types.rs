//! Core types for listening sessions

use serde::{Deserialize, Serialize};

/// Where the playback task currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting for a listener to enqueue something
    WaitingForNext,

    /// Queue ran dry; fetching and resolving a related track
    FetchingAutoplay,

    /// A track is playing
    Playing,

    /// Session torn down; it can't be reused
    Terminated,
}

/// Listener-adjustable playback modes
///
/// Lives behind a single lock inside the session and only changes through
/// session methods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Replay the current track indefinitely
    pub looping: bool,

    /// Continue with related tracks when the queue runs dry
    pub autoplay: bool,

    /// Linear volume in (0, 1], applied at the start of each track
    pub volume: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            looping: false,
            autoplay: true,
            volume: 0.5,
        }
    }
}

/// Why a track started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayReason {
    /// Taken from the queue
    Queue,

    /// Replay in loop mode
    Loop,

    /// Picked from related content
    Autoplay,
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Nothing was enqueued before the idle timeout
    Idle,

    /// `stop()` was called
    Stopped,

    /// Autoplay could not produce a follow-up track
    AutoplayFailed(String),

    /// The audio output lost its connection
    Disconnected,
}
