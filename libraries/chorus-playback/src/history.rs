//! Playback history tracking
//!
//! Records every item the session committed to play, most recent first, so
//! autoplay can steer away from recently heard tracks.

use chorus_core::PlayableItem;
use std::collections::VecDeque;

/// Playback history, most recent first
///
/// Unbounded unless a limit is set. Only the first `window` entries matter to
/// autoplay; older ones are kept for display.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// History buffer (most recent = front)
    items: VecDeque<PlayableItem>,

    /// Optional maximum size
    limit: Option<usize>,
}

impl History {
    /// Create unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create history that keeps at most `limit` entries
    pub fn with_limit(limit: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(limit),
            limit: Some(limit),
        }
    }

    /// Prepend an item that is about to play
    ///
    /// Loop repeats are recorded too, so the same item can appear many times.
    pub fn record(&mut self, item: PlayableItem) {
        self.items.push_front(item);
        if let Some(limit) = self.limit {
            self.items.truncate(limit);
        }
    }

    /// Most recently recorded item
    pub fn latest(&self) -> Option<&PlayableItem> {
        self.items.front()
    }

    /// Up to `window` most recent items, newest first
    pub fn recent(&self, window: usize) -> impl Iterator<Item = &PlayableItem> {
        self.items.iter().take(window)
    }

    /// Whether `url` is the origin of one of the `window` most recent items
    pub fn contains_origin(&self, url: &str, window: usize) -> bool {
        self.recent(window).any(|item| item.origin_url() == url)
    }

    /// Copy of all entries, newest first
    pub fn snapshot(&self) -> Vec<PlayableItem> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
