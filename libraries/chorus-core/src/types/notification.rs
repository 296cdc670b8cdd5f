//! Messages a session sends to its notification sink

use super::PlayableItem;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Structured "now playing" data
///
/// Rendering (embeds, colours, markdown) is up to the notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub title: String,
    pub duration: Option<Duration>,
    pub requester_name: String,
    pub requester_avatar: Option<String>,
    pub uploader: String,
    pub uploader_url: String,
    pub url: String,
    pub thumbnail: Option<String>,
}

impl From<&PlayableItem> for NowPlaying {
    fn from(item: &PlayableItem) -> Self {
        let info = &item.source.info;
        Self {
            title: info.title.clone(),
            duration: info.duration,
            requester_name: item.requester.name.clone(),
            requester_avatar: item.requester.avatar_url.clone(),
            uploader: info.uploader.clone(),
            uploader_url: info.uploader_url.clone(),
            url: info.origin_url.clone(),
            thumbnail: info.thumbnail.clone(),
        }
    }
}

/// Something the session wants listeners to see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    /// Plain text message
    Text(String),

    /// A track started playing
    NowPlaying(NowPlaying),
}

impl Notification {
    pub fn text(msg: impl Into<String>) -> Self {
        Self::Text(msg.into())
    }
}
