//! Deferred actions attached to a flow node

use crate::answers::{AnswerKind, Answers};
use crate::error::ExecError;
use crate::flow::FlowBuilder;
use crate::jitter::ExecContext;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Background work run under the timed executor
pub type ExecFn = Arc<dyn Fn(ExecContext) -> BoxFuture<'static, Result<(), ExecError>> + Send + Sync>;

/// Subgraph constructor invoked at the session's current position
pub type BranchFn = Arc<dyn Fn(&mut FlowBuilder<'_>) + Send + Sync>;

/// Produces display text when the event fires, not when it is configured
pub type DisplayFn = Arc<dyn Fn(&Answers) -> String + Send + Sync>;

/// One slot in a node's event sequence. Exactly one kind per slot.
#[derive(Clone)]
pub enum Event {
    /// Run a callback under the node's deadline and loading message
    RunExec { task: ExecFn },
    /// Replace the node's instruction and extend the graph in place
    Branch {
        instruction: String,
        build: BranchFn,
    },
    /// Same as `Branch`, with the constructor taken from the registry
    GoTo {
        name: String,
        instruction: String,
        build: BranchFn,
    },
    Display { render: DisplayFn },
    AskQuestion {
        question: String,
        key: String,
        kind: AnswerKind,
    },
    Quit { message: String },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::RunExec { .. } => "run_exec",
            Event::Branch { .. } => "branch",
            Event::GoTo { .. } => "go_to",
            Event::Display { .. } => "display",
            Event::AskQuestion { .. } => "ask_question",
            Event::Quit { .. } => "quit",
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::RunExec { .. } => f.write_str("RunExec"),
            Event::Branch { instruction, .. } => f
                .debug_struct("Branch")
                .field("instruction", instruction)
                .finish_non_exhaustive(),
            Event::GoTo {
                name, instruction, ..
            } => f
                .debug_struct("GoTo")
                .field("name", name)
                .field("instruction", instruction)
                .finish_non_exhaustive(),
            Event::Display { .. } => f.write_str("Display"),
            Event::AskQuestion {
                question,
                key,
                kind,
            } => f
                .debug_struct("AskQuestion")
                .field("question", question)
                .field("key", key)
                .field("kind", kind)
                .finish(),
            Event::Quit { message } => f.debug_struct("Quit").field("message", message).finish(),
        }
    }
}
