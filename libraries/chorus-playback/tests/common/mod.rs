//! Shared fakes and fixtures for session tests
#![allow(dead_code)]

use async_trait::async_trait;
use chorus_core::{
    AudioSink, AudioSource, Completion, ExtractionError, FetchError, Notification, Notifier,
    NotifyError, PlayableItem, PlaybackError, RelatedFetcher, Requester, SourceResolver,
    TrackInfo,
};
use chorus_playback::{Collaborators, PlayReason, Session, SessionConfig, SessionEvent};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

// ===== Fixtures =====

pub fn url(id: &str) -> String {
    format!("https://video.example/watch?v={id}")
}

pub fn requester() -> Requester {
    Requester::new("42", "alice").with_avatar("https://cdn.example/alice.png")
}

/// Item resolved from `url(id)`, titled "Title of <url>"
pub fn item(id: &str) -> PlayableItem {
    let origin = url(id);
    PlayableItem::new(info_for(&origin), requester())
}

fn info_for(origin: &str) -> TrackInfo {
    TrackInfo::new(
        format!("Title of {origin}"),
        origin,
        format!("{origin}&stream=1"),
    )
    .with_duration(Duration::from_secs(200))
    .with_uploader("Uploader", "https://video.example/channel/1")
}

/// Config with the playback task's real timings
pub fn config() -> SessionConfig {
    SessionConfig::default()
}

pub fn config_without_autoplay() -> SessionConfig {
    SessionConfig {
        autoplay: false,
        ..SessionConfig::default()
    }
}

// ===== Gate =====

/// Holds a collaborator call open until the test lets it through
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }

    /// Wait until a call is parked at the gate
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

// ===== Sink =====

/// Sink that plays until told otherwise
pub struct FakeSink {
    played: Mutex<Vec<AudioSource>>,
    pending: Mutex<Option<Completion>>,
    connected: AtomicBool,
    refuse_next: AtomicBool,
    disconnects: AtomicUsize,
}

impl FakeSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            played: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            connected: AtomicBool::new(true),
            refuse_next: AtomicBool::new(false),
            disconnects: AtomicUsize::new(0),
        })
    }

    /// Sources handed to `play`, in order
    pub fn played(&self) -> Vec<AudioSource> {
        self.played.lock().clone()
    }

    pub fn played_titles(&self) -> Vec<String> {
        self.played
            .lock()
            .iter()
            .map(|source| source.info.title.clone())
            .collect()
    }

    /// End the current track naturally
    pub fn finish(&self) {
        self.complete(None);
    }

    /// End the current track with an output error
    pub fn fail(&self, reason: &str) {
        self.complete(Some(PlaybackError::sink(reason)));
    }

    /// Make the next `play` call return an error
    pub fn refuse_next_play(&self) {
        self.refuse_next.store(true, Ordering::SeqCst);
    }

    pub fn is_connected_now(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Lose the connection from the outside; the current track just ends
    pub fn drop_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
        let pending = self.pending.lock().take();
        if let Some(on_complete) = pending {
            on_complete(None);
        }
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    fn complete(&self, error: Option<PlaybackError>) {
        let pending = self.pending.lock().take();
        let on_complete = pending.expect("nothing is playing");
        on_complete(error);
    }
}

#[async_trait]
impl AudioSink for FakeSink {
    async fn play(&self, source: &AudioSource, on_complete: Completion) -> Result<(), PlaybackError> {
        if !self.is_connected() {
            return Err(PlaybackError::NotConnected);
        }
        if self.refuse_next.swap(false, Ordering::SeqCst) {
            return Err(PlaybackError::sink("device busy"));
        }

        self.played.lock().push(source.clone());
        *self.pending.lock() = Some(on_complete);
        Ok(())
    }

    fn stop(&self) {
        let pending = self.pending.lock().take();
        if let Some(on_complete) = pending {
            on_complete(None);
        }
    }

    async fn disconnect(&self) {
        self.stop();
        self.connected.store(false, Ordering::SeqCst);
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

// ===== Notifier =====

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    typing: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|notification| match notification {
                Notification::Text(text) => Some(text.clone()),
                Notification::NowPlaying(_) => None,
            })
            .collect()
    }

    pub fn now_playing_titles(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|notification| match notification {
                Notification::NowPlaying(now) => Some(now.title.clone()),
                Notification::Text(_) => None,
            })
            .collect()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn typing_count(&self) -> usize {
        self.typing.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().push(notification);
        Ok(())
    }

    async fn typing(&self) {
        self.typing.fetch_add(1, Ordering::SeqCst);
    }
}

// ===== Resolver =====

/// Resolves every query to an item whose origin is the query itself
#[derive(Default)]
pub struct StaticResolver {
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(String, Requester)>>,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl StaticResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make resolving `query` fail
    pub fn fail_on(&self, query: &str) {
        self.failing.lock().insert(query.to_string());
    }

    pub fn calls(&self) -> Vec<(String, Requester)> {
        self.calls.lock().clone()
    }

    /// Park every following resolve until the returned gate is released
    pub fn gate(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl SourceResolver for StaticResolver {
    async fn resolve(
        &self,
        query: &str,
        requester: &Requester,
    ) -> Result<PlayableItem, ExtractionError> {
        self.calls
            .lock()
            .push((query.to_string(), requester.clone()));

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        if self.failing.lock().contains(query) {
            return Err(ExtractionError::new(query, "video unavailable"));
        }

        Ok(PlayableItem::new(info_for(query), requester.clone()))
    }
}

// ===== Fetcher =====

/// Related lists keyed by origin URL; unknown origins have no related content
#[derive(Default)]
pub struct StaticFetcher {
    related: Mutex<HashMap<String, Result<Vec<String>, FetchError>>>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl StaticFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, origin: &str, candidates: &[String]) {
        self.related
            .lock()
            .insert(origin.to_string(), Ok(candidates.to_vec()));
    }

    pub fn fail_on(&self, origin: &str, error: FetchError) {
        self.related.lock().insert(origin.to_string(), Err(error));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Park every following fetch until the returned gate is released
    pub fn gate(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl RelatedFetcher for StaticFetcher {
    async fn fetch_related(&self, origin_url: &str) -> Result<Vec<String>, FetchError> {
        self.calls.lock().push(origin_url.to_string());

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        self.related
            .lock()
            .get(origin_url)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ===== Harness =====

/// A running session wired to fakes
pub struct Harness {
    pub session: Session,
    pub sink: Arc<FakeSink>,
    pub notifier: Arc<RecordingNotifier>,
    pub resolver: Arc<StaticResolver>,
    pub fetcher: Arc<StaticFetcher>,
    events: broadcast::Receiver<SessionEvent>,
}

impl Harness {
    pub fn start(config: SessionConfig) -> Self {
        let sink = FakeSink::new();
        let notifier = RecordingNotifier::new();
        let resolver = StaticResolver::new();
        let fetcher = StaticFetcher::new();

        let collaborators = Collaborators {
            resolver: resolver.clone(),
            fetcher: fetcher.clone(),
            notifier: notifier.clone(),
        };
        let session =
            Session::start(config, collaborators, sink.clone()).expect("valid test config");
        let events = session.subscribe();

        Self {
            session,
            sink,
            notifier,
            resolver,
            fetcher,
            events,
        }
    }

    /// Next event other than queue changes
    pub async fn next_event(&mut self) -> SessionEvent {
        let wait = async {
            loop {
                match self.events.recv().await {
                    Ok(SessionEvent::QueueChanged { .. }) => continue,
                    Ok(event) => return event,
                    Err(e) => panic!("event stream broken: {e}"),
                }
            }
        };

        tokio::time::timeout(Duration::from_secs(3600), wait)
            .await
            .expect("no session event within an hour")
    }

    /// Events already delivered, queue changes included
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    pub async fn expect_started(&mut self) -> (PlayableItem, PlayReason) {
        match self.next_event().await {
            SessionEvent::TrackStarted { item, reason } => (item, reason),
            other => panic!("expected TrackStarted, got {other:?}"),
        }
    }

    pub async fn expect_finished(&mut self) -> (PlayableItem, Option<String>) {
        match self.next_event().await {
            SessionEvent::TrackFinished { item, error } => (item, error),
            other => panic!("expected TrackFinished, got {other:?}"),
        }
    }
}
