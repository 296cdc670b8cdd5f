//! Listening session - playback state machine
//!
//! One background task per session decides what plays next:
//!
//! ```text
//!            ┌──────────────── loop on ────────────────┐
//!            │                                          ▼
//!   WaitingForNext ── dequeue (3 s / 180 s) ──► Playing ── completion ──┐
//!        ▲    │                                   ▲                     │
//!        │    └─ 3 s timeout ─► FetchingAutoplay ─┘                     │
//!        │                        │ fetch/resolve error                 │
//!        │    180 s timeout ──────┴──────────────► Terminated           │
//!        └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A sink that has lost its connection is fatal from any state that is
//! about to play.
//!
//! Teardown is explicit: [`Session::stop`] (or a fatal path inside the task)
//! cancels the task through a [`CancellationToken`]. Every suspension point
//! in the task races against that token, and state is only mutated after
//! checking the session is still alive.

use crate::{
    config::SessionConfig,
    error::{Result, SessionError},
    events::SessionEvent,
    history::History,
    queue::{PlaybackQueue, QueueTimeout},
    selector::RecommendationSelector,
    types::{PlayReason, SessionPhase, SessionSettings, TerminationReason},
};
use chorus_core::{
    AudioSink, Completion, Notification, NowPlaying, Notifier, PlayableItem, PlaybackError,
    RelatedFetcher, Requester, RequesterId, SessionId, SourceResolver,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// External services a session talks to, besides its audio sink
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn SourceResolver>,
    pub fetcher: Arc<dyn RelatedFetcher>,
    pub notifier: Arc<dyn Notifier>,
}

/// A listening session bound to one audio sink
///
/// Created with [`Session::start`], which spawns the playback task. The session
/// is usable until [`Session::stop`] is called or the task ends on its own
/// (idle timeout, autoplay failure); after that [`Session::is_alive`] is false
/// forever and a new session must be started.
pub struct Session {
    inner: Arc<SessionInner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// What the playback task owns besides the queue
struct PlaybackState {
    current: Option<PlayableItem>,
    history: History,
    phase: SessionPhase,
}

/// Why the playback task stopped picking tracks
enum Halt {
    /// Token cancelled from outside; whoever cancelled does the cleanup
    Cancelled,

    /// Session must end
    Fatal(TerminationReason),
}

type CompletionReceiver = oneshot::Receiver<Option<PlaybackError>>;

struct SessionInner {
    id: SessionId,
    config: SessionConfig,
    selector: RecommendationSelector,
    queue: PlaybackQueue,
    playback: Mutex<PlaybackState>,
    settings: Mutex<SessionSettings>,
    skip_votes: Mutex<HashSet<RequesterId>>,
    sink: Mutex<Option<Arc<dyn AudioSink>>>,
    alive: AtomicBool,
    cancel: CancellationToken,
    events: broadcast::Sender<SessionEvent>,
    collaborators: Collaborators,
}

impl Session {
    /// Start a session and its playback task
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        config: SessionConfig,
        collaborators: Collaborators,
        sink: Arc<dyn AudioSink>,
    ) -> Result<Self> {
        config.validate()?;

        let history = match config.history_limit {
            Some(limit) => History::with_limit(limit),
            None => History::new(),
        };
        let settings = SessionSettings {
            looping: config.looping,
            autoplay: config.autoplay,
            volume: config.default_volume,
        };
        let (events, _) = broadcast::channel(config.event_capacity);

        let inner = Arc::new(SessionInner {
            id: SessionId::generate(),
            selector: RecommendationSelector::new(config.history_window),
            config,
            queue: PlaybackQueue::new(),
            playback: Mutex::new(PlaybackState {
                current: None,
                history,
                phase: SessionPhase::WaitingForNext,
            }),
            settings: Mutex::new(settings),
            skip_votes: Mutex::new(HashSet::new()),
            sink: Mutex::new(Some(sink)),
            alive: AtomicBool::new(true),
            cancel: CancellationToken::new(),
            events,
            collaborators,
        });

        info!(session = %inner.id, "Starting listening session");
        let task = tokio::spawn(Arc::clone(&inner).run());

        Ok(Self {
            inner,
            task: Mutex::new(Some(task)),
        })
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    // ===== Queue =====

    /// Add a resolved item to the end of the queue
    pub fn enqueue(&self, item: PlayableItem) -> Result<()> {
        self.inner.ensure_alive()?;
        debug!(session = %self.inner.id, title = item.title(), "Enqueued");
        self.inner.queue.enqueue(item);

        // Teardown may have cleared the queue between the check and the push
        if !self.inner.is_alive() {
            self.inner.queue.clear();
            return Err(SessionError::Terminated);
        }

        self.inner.queue_changed();
        Ok(())
    }

    /// Resolve `query` and enqueue the result
    ///
    /// Returns a copy of the enqueued item.
    pub async fn request(&self, query: &str, requester: &Requester) -> Result<PlayableItem> {
        self.inner.ensure_alive()?;

        let collaborators = &self.inner.collaborators;
        collaborators.notifier.typing().await;
        let item = collaborators.resolver.resolve(query, requester).await?;

        self.enqueue(item.clone())?;
        Ok(item)
    }

    /// Copy of the queue, in play order
    pub fn queue(&self) -> Vec<PlayableItem> {
        self.inner.queue.snapshot()
    }

    /// Copy of a slice of the queue (see [`PlaybackQueue::peek_range`])
    pub fn queue_range(&self, start: usize, stop: Option<usize>, step: usize) -> Vec<PlayableItem> {
        self.inner.queue.peek_range(start, stop, step)
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn shuffle_queue(&self) {
        self.inner.queue.shuffle();
        self.inner.queue_changed();
    }

    /// Remove the queued item at `index` (0 = plays next)
    pub fn remove_from_queue(&self, index: usize) -> Result<PlayableItem> {
        let removed = self
            .inner
            .queue
            .remove_at(index)
            .ok_or(SessionError::IndexOutOfBounds(index))?;
        self.inner.queue_changed();
        Ok(removed)
    }

    pub fn clear_queue(&self) {
        self.inner.queue.clear();
        self.inner.queue_changed();
    }

    // ===== Playback =====

    /// Item currently playing (or last played, between tracks)
    pub fn current(&self) -> Option<PlayableItem> {
        self.inner.playback.lock().current.clone()
    }

    /// Copy of the play history, most recent first
    pub fn history(&self) -> Vec<PlayableItem> {
        self.inner.playback.lock().history.snapshot()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.playback.lock().phase
    }

    /// Whether the sink is outputting a track right now
    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    /// Whether the session still holds a connected sink
    pub fn is_connected(&self) -> bool {
        let sink = self.inner.sink.lock().clone();
        sink.is_some_and(|sink| sink.is_connected())
    }

    /// End the current track early and clear skip votes
    ///
    /// The sink fires its completion callback as for a natural end, so the
    /// playback task moves on to the next track. Returns whether anything was
    /// playing.
    pub fn skip(&self) -> bool {
        self.inner.skip_votes.lock().clear();

        if !self.inner.is_playing() {
            return false;
        }

        let sink = self.inner.sink.lock().clone();
        match sink {
            Some(sink) => {
                info!(session = %self.inner.id, "Skipping current track");
                sink.stop();
                true
            }
            None => false,
        }
    }

    /// Tear the session down
    ///
    /// Clears the queue, stops and disconnects the sink, releases it and
    /// waits for the playback task to exit. Safe to call more than once.
    pub async fn stop(&self) {
        self.inner.teardown(TerminationReason::Stopped).await;

        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!(session = %self.inner.id, "Playback task failed: {}", e);
            }
        }
    }

    // ===== Settings =====

    pub fn settings(&self) -> SessionSettings {
        *self.inner.settings.lock()
    }

    pub fn set_loop(&self, looping: bool) {
        self.inner.settings.lock().looping = looping;
    }

    /// Flip loop mode, returning the new value
    pub fn toggle_loop(&self) -> bool {
        let mut settings = self.inner.settings.lock();
        settings.looping = !settings.looping;
        settings.looping
    }

    pub fn set_autoplay(&self, autoplay: bool) {
        self.inner.settings.lock().autoplay = autoplay;
    }

    /// Set linear volume in (0, 1]; applies from the next track on
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        if !(volume > 0.0 && volume <= 1.0) {
            return Err(SessionError::InvalidVolume(volume));
        }
        self.inner.settings.lock().volume = volume;
        Ok(())
    }

    // ===== Skip votes =====

    /// Record a skip vote, returning the number of distinct voters
    pub fn register_skip_vote(&self, voter: RequesterId) -> usize {
        let mut votes = self.inner.skip_votes.lock();
        votes.insert(voter);
        votes.len()
    }

    pub fn skip_vote_count(&self) -> usize {
        self.inner.skip_votes.lock().len()
    }

    pub fn has_voted(&self, voter: &RequesterId) -> bool {
        self.inner.skip_votes.lock().contains(voter)
    }
}

impl SessionInner {
    /// Playback task
    async fn run(self: Arc<Self>) {
        debug!(session = %self.id, "Playback task started");

        loop {
            let (item, reason) = match self.next_track().await {
                Ok(next) => next,
                Err(halt) => {
                    self.halt(halt).await;
                    break;
                }
            };

            let done = match self.start_track(item, reason).await {
                Ok(done) => done,
                Err(halt) => {
                    self.halt(halt).await;
                    break;
                }
            };

            let outcome = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                outcome = done => outcome,
            };

            let error = match outcome {
                Ok(error) => error,
                Err(_) => Some(PlaybackError::sink("completion callback dropped")),
            };
            self.finish_track(error).await;
        }

        debug!(session = %self.id, "Playback task exited");
    }

    async fn halt(&self, halt: Halt) {
        if let Halt::Fatal(reason) = halt {
            self.teardown(reason).await;
        }
    }

    /// Decide what plays next
    async fn next_track(&self) -> std::result::Result<(PlayableItem, PlayReason), Halt> {
        let settings = *self.settings.lock();
        let current = self.playback.lock().current.clone();

        if settings.looping {
            if let Some(item) = current {
                return Ok((item, PlayReason::Loop));
            }
        }

        self.set_phase(SessionPhase::WaitingForNext);

        let previous = current.filter(|_| settings.autoplay);
        let wait = if previous.is_some() {
            self.config.autoplay_wait()
        } else {
            self.config.idle_timeout()
        };

        match self.cancellable(self.queue.dequeue_timeout(wait)).await {
            None => Err(Halt::Cancelled),
            Some(Ok(item)) => {
                self.queue_changed();
                Ok((item, PlayReason::Queue))
            }
            Some(Err(QueueTimeout { waited })) => match previous {
                Some(previous) => {
                    debug!(session = %self.id, "Queue empty after {:?}, autoplaying", waited);
                    self.autoplay(previous).await
                }
                None => {
                    info!(session = %self.id, "Nothing enqueued for {:?}, leaving", waited);
                    Err(Halt::Fatal(TerminationReason::Idle))
                }
            },
        }
    }

    /// Pick and resolve a related track for `previous`
    async fn autoplay(
        &self,
        previous: PlayableItem,
    ) -> std::result::Result<(PlayableItem, PlayReason), Halt> {
        self.set_phase(SessionPhase::FetchingAutoplay);

        let fetcher = &self.collaborators.fetcher;
        let candidates = match self.cancellable(fetcher.fetch_related(previous.origin_url())).await {
            None => return Err(Halt::Cancelled),
            Some(Ok(candidates)) => candidates,
            Some(Err(e)) => return Err(self.autoplay_failed(e.into()).await),
        };
        self.ensure_alive().map_err(|_| Halt::Cancelled)?;

        let selection = {
            let playback = self.playback.lock();
            self.selector
                .select(&candidates, playback.history.recent(self.selector.window()))
                .map(str::to_string)
        };
        let url = match selection {
            Ok(url) => url,
            Err(e) => return Err(self.autoplay_failed(e).await),
        };
        debug!(
            session = %self.id,
            candidates = candidates.len(),
            "Autoplay picked {}",
            url
        );

        self.cancellable(self.collaborators.notifier.typing()).await;

        let resolver = &self.collaborators.resolver;
        let item = match self
            .cancellable(resolver.resolve(&url, &previous.requester))
            .await
        {
            None => return Err(Halt::Cancelled),
            Some(Ok(item)) => item,
            Some(Err(e)) => return Err(self.autoplay_failed(e.into()).await),
        };
        self.ensure_alive().map_err(|_| Halt::Cancelled)?;

        self.notify(Notification::text(format!("Autoplaying {}", item.title())))
            .await;
        Ok((item, PlayReason::Autoplay))
    }

    async fn autoplay_failed(&self, error: SessionError) -> Halt {
        warn!(session = %self.id, "Autoplay failed: {}", error);

        self.notify(Notification::text(format!(
            "An error occurred while processing this request: {}",
            error
        )))
        .await;
        self.emit(SessionEvent::AutoplayFailed {
            message: error.to_string(),
        });

        Halt::Fatal(TerminationReason::AutoplayFailed(error.to_string()))
    }

    /// Commit `item` as current, record it and hand it to the sink
    ///
    /// A sink that lost its connection ends the session; nothing could ever
    /// play on it again.
    async fn start_track(
        &self,
        mut item: PlayableItem,
        reason: PlayReason,
    ) -> std::result::Result<CompletionReceiver, Halt> {
        let sink = self.sink.lock().clone().ok_or(Halt::Cancelled)?;
        if !sink.is_connected() {
            warn!(session = %self.id, "Audio output disconnected, leaving");
            return Err(Halt::Fatal(TerminationReason::Disconnected));
        }

        let volume = self.settings.lock().volume;
        item.source.set_volume(volume);

        {
            let mut playback = self.playback.lock();
            // Checked under the lock so teardown's reset can't be overwritten
            if !self.is_alive() {
                return Err(Halt::Cancelled);
            }
            playback.current = Some(item.clone());
            playback.history.record(item.clone());
            playback.phase = SessionPhase::Playing;
        }
        self.skip_votes.lock().clear();

        let (tx, rx) = oneshot::channel();
        let on_complete: Completion = Box::new(move |error| {
            // Receiver is gone once the session is torn down
            let _ = tx.send(error);
        });

        let played = self
            .cancellable(sink.play(&item.source, on_complete))
            .await
            .ok_or(Halt::Cancelled)?;

        if let Err(e) = played {
            if e == PlaybackError::NotConnected {
                warn!(session = %self.id, "Audio output disconnected, leaving");
                return Err(Halt::Fatal(TerminationReason::Disconnected));
            }
            warn!(session = %self.id, "Sink refused {}: {}", item.title(), e);

            // Never started: report it as an abnormal end right away
            let (tx, rx) = oneshot::channel();
            let _ = tx.send(Some(e));
            return Ok(rx);
        }

        info!(
            session = %self.id,
            reason = ?reason,
            "Now playing: {}",
            item.title()
        );
        self.notify(Notification::NowPlaying(NowPlaying::from(&item)))
            .await;
        self.emit(SessionEvent::TrackStarted { item, reason });

        Ok(rx)
    }

    async fn finish_track(&self, error: Option<PlaybackError>) {
        let item = self.playback.lock().current.clone();

        if let Some(e) = &error {
            error!(session = %self.id, "Playback error: {}", e);
            self.notify(Notification::text(format!("Playback error: {}", e)))
                .await;
        }

        if let Some(item) = item {
            debug!(session = %self.id, "Finished: {}", item.title());
            self.emit(SessionEvent::TrackFinished {
                item,
                error: error.map(|e| e.to_string()),
            });
        }
    }

    /// Mark dead, cancel the task, clear the queue and release the sink
    ///
    /// Only the first call does anything.
    async fn teardown(&self, reason: TerminationReason) {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return;
        }

        self.cancel.cancel();
        self.queue.clear();
        self.skip_votes.lock().clear();
        {
            let mut playback = self.playback.lock();
            playback.current = None;
            playback.phase = SessionPhase::Terminated;
        }

        let sink = self.sink.lock().take();
        if let Some(sink) = sink {
            sink.stop();
            if sink.is_connected() {
                sink.disconnect().await;
            }
        }

        info!(session = %self.id, reason = ?reason, "Session terminated");
        self.emit(SessionEvent::Terminated { reason });
    }

    /// Run `fut` unless the session gets cancelled first
    async fn cancellable<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            output = fut => Some(output),
        }
    }

    async fn notify(&self, notification: Notification) {
        if let Some(Err(e)) = self
            .cancellable(self.collaborators.notifier.send(notification))
            .await
        {
            warn!(session = %self.id, "Failed to send notification: {}", e);
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn queue_changed(&self) {
        self.emit(SessionEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn set_phase(&self, phase: SessionPhase) {
        let mut playback = self.playback.lock();
        if self.is_alive() {
            playback.phase = phase;
        }
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(SessionError::Terminated)
        }
    }

    fn is_playing(&self) -> bool {
        let playing = {
            let playback = self.playback.lock();
            playback.phase == SessionPhase::Playing && playback.current.is_some()
        };
        playing && self.sink.lock().is_some()
    }
}
