//! Session registry
//!
//! Keeps at most one live session per context (e.g. one per server or room).
//! Sessions that ended on their own are replaced on the next
//! [`SessionRegistry::get_or_start`] and dropped by [`SessionRegistry::sweep`].

use crate::{
    config::SessionConfig,
    error::Result,
    session::{Collaborators, Session},
};
use chorus_core::{AudioSink, ContextId, Notifier, RelatedFetcher, SourceResolver};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Live sessions by context
pub struct SessionRegistry {
    config: SessionConfig,
    resolver: Arc<dyn SourceResolver>,
    fetcher: Arc<dyn RelatedFetcher>,
    sessions: RwLock<HashMap<ContextId, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create a registry whose sessions share `config`, `resolver` and `fetcher`
    pub fn new(
        config: SessionConfig,
        resolver: Arc<dyn SourceResolver>,
        fetcher: Arc<dyn RelatedFetcher>,
    ) -> Self {
        Self {
            config,
            resolver,
            fetcher,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Live session for `context`, if any
    pub async fn get(&self, context: &ContextId) -> Option<Arc<Session>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(context)
            .filter(|session| session.is_alive())
            .cloned()
    }

    /// Live session for `context`, starting one on `sink` if needed
    ///
    /// `sink` and `notifier` are only used when a new session is started.
    pub async fn get_or_start(
        &self,
        context: &ContextId,
        sink: Arc<dyn AudioSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Arc<Session>> {
        let mut sessions = self.sessions.write().await;

        if let Some(session) = sessions.get(context) {
            if session.is_alive() {
                return Ok(Arc::clone(session));
            }
            debug!(context = %context, "Replacing ended session");
        }

        let collaborators = Collaborators {
            resolver: Arc::clone(&self.resolver),
            fetcher: Arc::clone(&self.fetcher),
            notifier,
        };
        let session = Arc::new(Session::start(self.config.clone(), collaborators, sink)?);
        info!(context = %context, session = %session.id(), "Session started");

        sessions.insert(context.clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Stop and remove the session for `context`
    ///
    /// Returns whether there was one.
    pub async fn stop(&self, context: &ContextId) -> bool {
        let removed = self.sessions.write().await.remove(context);

        match removed {
            Some(session) => {
                session.stop().await;
                true
            }
            None => false,
        }
    }

    /// Drop sessions that ended on their own, returning how many were removed
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.is_alive());

        let removed = before - sessions.len();
        if removed > 0 {
            debug!("Swept {} ended sessions", removed);
        }
        removed
    }

    /// Stop every session
    pub async fn stop_all(&self) {
        let sessions: Vec<_> = self.sessions.write().await.drain().collect();

        for (context, session) in sessions {
            debug!(context = %context, "Stopping session");
            session.stop().await;
        }
    }

    /// Number of registered sessions, including ended ones not yet swept
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
