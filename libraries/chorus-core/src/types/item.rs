//! Resolved audio sources and queue entries

use super::{ItemId, Requester};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Metadata a source resolver supplies for every playable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Display title
    pub title: String,

    /// Track length, if the source reports one (live streams don't)
    pub duration: Option<Duration>,

    /// Uploader / channel name
    pub uploader: String,

    /// Uploader / channel page
    pub uploader_url: String,

    /// Direct media stream the sink decodes
    pub stream_url: String,

    /// Page the item was resolved from; compared against history for autoplay
    pub origin_url: String,

    /// Thumbnail image
    pub thumbnail: Option<String>,
}

impl TrackInfo {
    /// Create track info with the fields every source has
    pub fn new(
        title: impl Into<String>,
        origin_url: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            duration: None,
            uploader: String::new(),
            uploader_url: String::new(),
            stream_url: stream_url.into(),
            origin_url: origin_url.into(),
            thumbnail: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_uploader(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.uploader = name.into();
        self.uploader_url = url.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// Resolved audio handle handed to the sink
///
/// Volume is the only mutable part; the session sets it right before each play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSource {
    pub info: TrackInfo,
    volume: f32,
}

/// Volume a freshly resolved source starts with
pub const DEFAULT_SOURCE_VOLUME: f32 = 0.5;

impl AudioSource {
    pub fn new(info: TrackInfo) -> Self {
        Self {
            info,
            volume: DEFAULT_SOURCE_VOLUME,
        }
    }

    /// Linear output volume (0.0 - 1.0)
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set linear output volume, clamped to 0.0 - 1.0
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

/// A resolved source plus the listener who asked for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayableItem {
    pub id: ItemId,
    pub source: AudioSource,
    pub requester: Requester,
    pub enqueued_at: DateTime<Utc>,
}

impl PlayableItem {
    pub fn new(info: TrackInfo, requester: Requester) -> Self {
        Self {
            id: ItemId::generate(),
            source: AudioSource::new(info),
            requester,
            enqueued_at: Utc::now(),
        }
    }

    pub fn title(&self) -> &str {
        &self.source.info.title
    }

    pub fn origin_url(&self) -> &str {
        &self.source.info.origin_url
    }

    pub fn stream_url(&self) -> &str {
        &self.source.info.stream_url
    }
}
