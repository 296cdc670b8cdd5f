/// Session configuration
use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for a listening session
///
/// All fields have defaults; a config file or `CHORUS_*` environment variables
/// only need to name the ones they change.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// How long to wait for a listener to enqueue something before autoplay kicks in
    #[serde(default = "default_autoplay_wait_secs")]
    pub autoplay_wait_secs: u64,

    /// How long an idle session (autoplay off or nothing played yet) waits before tearing down
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Number of most recent history entries autoplay avoids repeating
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Optional cap on stored history entries (unbounded when unset)
    #[serde(default)]
    pub history_limit: Option<usize>,

    /// Initial linear volume, in (0, 1]
    #[serde(default = "default_volume")]
    pub default_volume: f32,

    /// Whether autoplay starts enabled
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,

    /// Whether loop mode starts enabled
    #[serde(default)]
    pub looping: bool,

    /// Buffered session events per subscriber
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl SessionConfig {
    /// Load configuration from `chorus.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("chorus.toml"))
    }

    /// Load configuration from a specific file (if present) and the environment
    ///
    /// Environment variables are prefixed with `CHORUS_`, e.g.
    /// `CHORUS_IDLE_TIMEOUT_SECS=300`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(config::Environment::with_prefix("CHORUS").try_parsing(true));

        let config = settings
            .build()
            .map_err(|e| SessionError::Config(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| SessionError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.autoplay_wait_secs == 0 {
            return Err(SessionError::Config(
                "autoplay_wait_secs must be at least 1".to_string(),
            ));
        }

        if self.idle_timeout_secs == 0 {
            return Err(SessionError::Config(
                "idle_timeout_secs must be at least 1".to_string(),
            ));
        }

        if !(self.default_volume > 0.0 && self.default_volume <= 1.0) {
            return Err(SessionError::Config(format!(
                "default_volume must be in (0, 1], got {}",
                self.default_volume
            )));
        }

        if self.history_window == 0 {
            return Err(SessionError::Config(
                "history_window must be at least 1".to_string(),
            ));
        }

        if self.event_capacity == 0 {
            return Err(SessionError::Config(
                "event_capacity must be at least 1".to_string(),
            ));
        }

        if self.history_limit == Some(0) {
            return Err(SessionError::Config(
                "history_limit must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn autoplay_wait(&self) -> Duration {
        Duration::from_secs(self.autoplay_wait_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

// Default values
fn default_autoplay_wait_secs() -> u64 {
    3
}

fn default_idle_timeout_secs() -> u64 {
    180
}

fn default_history_window() -> usize {
    crate::selector::DEFAULT_HISTORY_WINDOW
}

fn default_volume() -> f32 {
    0.5
}

fn default_autoplay() -> bool {
    true
}

fn default_event_capacity() -> usize {
    64
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autoplay_wait_secs: default_autoplay_wait_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            history_window: default_history_window(),
            history_limit: None,
            default_volume: default_volume(),
            autoplay: default_autoplay(),
            looping: false,
            event_capacity: default_event_capacity(),
        }
    }
}
