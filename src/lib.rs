//! flowshell - scripted interactive wizards for the terminal
//!
//! A host program describes a wizard as a graph of prompts with a
//! [`FlowBuilder`]; a [`Session`] then drives it from user input, running
//! timed background tasks with an animated progress line, collecting typed
//! answers and keeping a bounded history of what was said.

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod answers;
pub mod config;
pub mod console;
pub mod error;
pub mod flow;
pub mod history;
pub mod input;
pub mod jitter;
pub mod session;
mod wizard;

pub use answers::{AnswerKind, Answers};
pub use config::SessionConfig;
pub use console::{Console, MemoryConsole, TerminalConsole};
pub use error::{ConfigError, ExecError, ShellError};
pub use flow::{FlowBuilder, FlowGraph, NodeId};
pub use history::{HistoryBuffer, HistoryRecord};
pub use input::{BufSource, LineSource, StdinSource};
pub use jitter::{ExecContext, Jitter};
pub use session::{ExitReason, ProductionSession, Session, SessionHandle, SessionReport, SessionState};
pub use wizard::Wizard;
