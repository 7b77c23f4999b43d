//! Error types for the flow engine

use thiserror::Error;

/// Tokens the session handles itself; they can never lead to a child node.
pub const RESERVED_WORDS: [&str; 3] = [EXIT, QUIT, BACK];

pub const EXIT: &str = "exit";
pub const QUIT: &str = "quit";
pub const BACK: &str = "back";

/// Programmer mistakes detected while building the flow graph.
///
/// These are fatal: the host program must not start (or continue) a
/// session once one has been raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{word} is a reserved word; please use inputs other than: exit, quit, back")]
    ReservedWord { word: String },
    #[error("if_user_inputs needs at least one token")]
    NoTokens,
    #[error("history buffer capacity must be at least 1")]
    ZeroCapacity,
}

/// Outcome of a `RunExec` callback or of the timed executor around it.
///
/// `EndOfInput` and `BlankLine` are sentinel values: the session swallows
/// them instead of displaying an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("end of input")]
    EndOfInput,
    #[error("blank line")]
    BlankLine,
    #[error("timed out after {after_ms}ms{}", detail_suffix(.detail))]
    Timeout {
        after_ms: u64,
        /// Error the callback returned once it observed cancellation
        detail: Option<String>,
    },
    #[error("interrupted")]
    Interrupted,
    #[error("task panicked")]
    Panicked,
    #[error("{0}")]
    Failed(String),
}

impl ExecError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Sentinels are handled without any user-visible message
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::EndOfInput | Self::BlankLine)
    }
}

/// Errors that end a session abnormally
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode transcript: {0}")]
    Transcript(#[from] serde_json::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
}

pub fn is_reserved(token: &str) -> bool {
    RESERVED_WORDS.contains(&token)
}
