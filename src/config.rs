//! Session configuration

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of history records kept by a session
pub const DEFAULT_BUFFER_SIZE: usize = 10;
/// Animation period of the progress indicator
pub const DEFAULT_TICK: Duration = Duration::from_millis(140);
/// Deadline for `RunExec` events on nodes that don't set their own
pub const DEFAULT_WAIT: Duration = Duration::from_secs(10);

/// Configuration handed to the session loop at construction time
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Banner lines printed once when the session starts
    pub greeting: Vec<String>,
    /// Capacity of the history buffer
    pub buffer_size: usize,
    /// Progress indicator period
    pub tick: Duration,
    /// Deadline applied to nodes created without `with_timeout`
    pub default_wait: Duration,
    /// Where to write the history as JSON lines on exit
    pub transcript_path: Option<PathBuf>,
    pub exit_message: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: Vec::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            tick: DEFAULT_TICK,
            default_wait: DEFAULT_WAIT,
            transcript_path: None,
            exit_message: "exiting...".to_string(),
        }
    }
}

impl SessionConfig {
    /// Defaults overlaid with `FLOWSHELL_*` environment variables.
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(size) = std::env::var("FLOWSHELL_BUFFER_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.buffer_size = size;
        }
        if let Some(ms) = std::env::var("FLOWSHELL_TICK_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.tick = Duration::from_millis(ms);
        }
        config.transcript_path = std::env::var_os("FLOWSHELL_TRANSCRIPT").map(PathBuf::from);
        config
    }

    pub fn with_greeting<I, L>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.greeting = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_transcript(mut self, path: impl Into<PathBuf>) -> Self {
        self.transcript_path = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}
