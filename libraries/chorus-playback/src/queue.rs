//! Session play queue
//!
//! A FIFO of resolved items that the playback task drains with a blocking,
//! timeout-bounded dequeue while listeners keep adding, removing and shuffling
//! entries from other tasks.

use chorus_core::PlayableItem;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Notify;

/// Play queue shared between listeners and the playback task
///
/// Structure:
/// ```text
/// Currently Playing: Track A        (owned by the session, not the queue)
/// ─────────────────────────────
/// Queue (front plays next):
///   0 - Track B
///   1 - Track C
///   2 - Track D
/// ```
///
/// Insertion order is play order. Only [`PlaybackQueue::shuffle`] and
/// [`PlaybackQueue::remove_at`] change it. Every synchronous operation takes the
/// lock briefly and never across an await, so they are safe while
/// [`PlaybackQueue::dequeue`] is pending.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    items: Mutex<VecDeque<PlayableItem>>,

    /// Wakes a pending dequeue when an item arrives
    available: Notify,
}

/// Dequeue gave up waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueTimeout {
    pub waited: Duration,
}

impl PlaybackQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item; wakes at most one pending dequeue
    pub fn enqueue(&self, item: PlayableItem) {
        self.items.lock().push_back(item);
        self.available.notify_one();
    }

    /// Take the next item, waiting until one is enqueued
    ///
    /// Cancel-safe: if the returned future is dropped, no item is lost.
    pub async fn dequeue(&self) -> PlayableItem {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Register before checking so an enqueue between the check and the
            // await still wakes us.
            notified.as_mut().enable();

            if let Some(item) = self.items.lock().pop_front() {
                return item;
            }

            notified.await;
        }
    }

    /// Take the next item, waiting at most `timeout`
    pub async fn dequeue_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<PlayableItem, QueueTimeout> {
        tokio::time::timeout(timeout, self.dequeue())
            .await
            .map_err(|_| QueueTimeout { waited: timeout })
    }

    /// Take the next item without waiting
    pub fn try_dequeue(&self) -> Option<PlayableItem> {
        self.items.lock().pop_front()
    }

    /// Copy of the items in `start..stop` taking every `step`th
    ///
    /// `stop` of `None` means "to the end". Out-of-range bounds are clipped and
    /// a `step` of 0 is treated as 1.
    pub fn peek_range(&self, start: usize, stop: Option<usize>, step: usize) -> Vec<PlayableItem> {
        let items = self.items.lock();
        let stop = stop.unwrap_or(items.len()).min(items.len());
        if start >= stop {
            return Vec::new();
        }

        items
            .range(start..stop)
            .step_by(step.max(1))
            .cloned()
            .collect()
    }

    /// Copy of the item at `index`
    pub fn get(&self, index: usize) -> Option<PlayableItem> {
        self.items.lock().get(index).cloned()
    }

    /// Copy of every queued item, in play order
    pub fn snapshot(&self) -> Vec<PlayableItem> {
        self.items.lock().iter().cloned().collect()
    }

    /// Remove item by index
    ///
    /// Returns the removed item if the index was in range
    pub fn remove_at(&self, index: usize) -> Option<PlayableItem> {
        self.items.lock().remove(index)
    }

    /// Randomize play order (Fisher-Yates)
    pub fn shuffle(&self) {
        let mut items = self.items.lock();
        items.make_contiguous().shuffle(&mut thread_rng());
    }

    /// Remove every queued item
    pub fn clear(&self) {
        self.items.lock().clear();
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
