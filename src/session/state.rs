//! Session state and exit reporting

use crate::answers::Answers;
use crate::flow::FlowGraph;
use crate::history::HistoryBuffer;
use serde::Serialize;

/// Where the session loop is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    Greeting,
    /// A command read is (or is about to be) in flight
    AwaitingCommand,
    /// A `RunExec` callback is running under the timed executor
    Executing,
    /// Free-form answer mode for `key`
    AwaitingAnswer { key: String },
    Terminated,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }

    pub fn answering_key(&self) -> Option<&str> {
        match self {
            SessionState::AwaitingAnswer { key } => Some(key),
            _ => None,
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExitReason {
    /// A `Quit` event fired
    Quit { message: String },
    /// The user typed `exit` or `quit`
    Exit,
    /// OS interrupt or `SessionHandle::interrupt`
    Interrupted,
    /// The current node has no options left to offer
    Exhausted,
    /// The input source reached end of stream
    InputClosed,
}

/// Everything a finished session leaves behind
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub reason: ExitReason,
    pub answers: Answers,
    pub history: HistoryBuffer,
    /// The flow graph as the session left it
    pub graph: FlowGraph,
}

impl SessionReport {
    /// Farewell message of a `Quit` event, if one ended the session
    pub fn quit_message(&self) -> Option<&str> {
        match &self.reason {
            ExitReason::Quit { message } => Some(message),
            _ => None,
        }
    }
}
