//! Error types for listening sessions

use chorus_core::{ExtractionError, FetchError, PlaybackError};
use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Resolver could not produce a playable item
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Recommendation source failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Sink failed to start or output a track
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// Recommendation source returned no candidates
    #[error("No related tracks found")]
    EmptyCandidates,

    /// Session has been torn down and can't be used anymore
    #[error("Session has been terminated")]
    Terminated,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Volume outside (0, 1]
    #[error("Invalid volume: {0} (expected a value in (0, 1])")]
    InvalidVolume(f32),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
