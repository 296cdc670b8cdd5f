//! Autoplay candidate selection
//!
//! Picks the follow-up URL from a related-content list, preferring one that
//! wasn't played recently but never failing while candidates exist.

use crate::error::{Result, SessionError};
use chorus_core::PlayableItem;
use std::collections::HashSet;

/// Number of recent history entries consulted by default
pub const DEFAULT_HISTORY_WINDOW: usize = 15;

/// Chooses the next autoplay target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationSelector {
    window: usize,
}

impl RecommendationSelector {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Select a candidate
    ///
    /// Returns the first candidate whose URL isn't the origin of one of the
    /// `window` most recent history entries (`recent` is newest first). If all
    /// of them were played recently, returns the first candidate.
    ///
    /// # Errors
    /// [`SessionError::EmptyCandidates`] if `candidates` is empty
    pub fn select<'c, 'h>(
        &self,
        candidates: &'c [String],
        recent: impl IntoIterator<Item = &'h PlayableItem>,
    ) -> Result<&'c str> {
        let first = candidates.first().ok_or(SessionError::EmptyCandidates)?;

        let played: HashSet<&str> = recent
            .into_iter()
            .take(self.window)
            .map(PlayableItem::origin_url)
            .collect();

        let fresh = candidates
            .iter()
            .find(|candidate| !played.contains(candidate.as_str()));

        Ok(fresh.unwrap_or(first).as_str())
    }
}

impl Default for RecommendationSelector {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}
