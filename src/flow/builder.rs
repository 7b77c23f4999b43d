//! Fluent construction of flow graphs
//!
//! The same builder is used to configure a wizard before the session starts
//! and, scoped to the session's current node, inside branch callbacks.

use super::{BranchFn, DisplayFn, Event, ExecFn, FlowGraph, NodeId};
use crate::answers::{AnswerKind, Answers};
use crate::error::{ConfigError, ExecError};
use crate::jitter::ExecContext;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Named subgraph constructors reachable through `go_to`
#[derive(Default, Clone)]
pub struct BranchRegistry {
    branches: HashMap<String, BranchFn>,
}

impl BranchRegistry {
    pub fn insert(&mut self, name: impl Into<String>, build: BranchFn) {
        self.branches.insert(name.into(), build);
    }

    pub fn get(&self, name: &str) -> Option<BranchFn> {
        self.branches.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }
}

enum Scope {
    /// Events on the base node are stored in the graph
    Configure,
    /// Events on the base node run once, right after the branch event
    Branch { inline: Vec<Event> },
}

/// Builder positioned at a base node.
///
/// `if_user_inputs` adds a child of the base node and makes it the target
/// of the `then_*`, `ask*` and `with_*` calls that follow. Before any child
/// is added, those calls target the base node itself.
pub struct FlowBuilder<'a> {
    graph: &'a mut FlowGraph,
    branches: &'a mut BranchRegistry,
    answers: &'a Answers,
    errors: &'a mut Vec<ConfigError>,
    base: NodeId,
    target: Option<NodeId>,
    scope: Scope,
}

impl<'a> FlowBuilder<'a> {
    pub(crate) fn configure(
        graph: &'a mut FlowGraph,
        branches: &'a mut BranchRegistry,
        errors: &'a mut Vec<ConfigError>,
    ) -> Self {
        static NO_ANSWERS: OnceLock<Answers> = OnceLock::new();
        Self {
            graph,
            branches,
            answers: NO_ANSWERS.get_or_init(Answers::new),
            errors,
            base: NodeId::ROOT,
            target: None,
            scope: Scope::Configure,
        }
    }

    pub(crate) fn branch_scope(
        graph: &'a mut FlowGraph,
        branches: &'a mut BranchRegistry,
        answers: &'a Answers,
        errors: &'a mut Vec<ConfigError>,
        base: NodeId,
    ) -> Self {
        Self {
            graph,
            branches,
            answers,
            errors,
            base,
            target: None,
            scope: Scope::Branch { inline: Vec::new() },
        }
    }

    /// Events queued for the base node by a branch callback
    pub(crate) fn into_inline(self) -> Vec<Event> {
        match self.scope {
            Scope::Configure => Vec::new(),
            Scope::Branch { inline } => inline,
        }
    }

    /// Answers collected so far in the session; always empty while the
    /// wizard is being configured
    pub fn answers(&self) -> &Answers {
        self.answers
    }

    /// Instruction shown when the base node prompts for a command
    pub fn first_instruction(&mut self, instruction: impl Into<String>) -> &mut Self {
        self.graph.node_mut(self.base).instruction = instruction.into();
        self
    }

    /// Respond to any of `tokens` by moving to a new child node
    pub fn if_user_inputs<I, T>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        match self.graph.add_child(self.base, &tokens) {
            Ok(child) => self.target = Some(child),
            Err(e) => {
                tracing::error!(error = %e, "Invalid flow configuration");
                self.errors.push(e);
                self.target = None;
            }
        }
        self
    }

    /// Token used when the user submits an empty line at the base node
    pub fn default(&mut self, token: impl Into<String>) -> &mut Self {
        self.graph.node_mut(self.base).default = Some(token.into());
        self
    }

    /// Run `task` under the timed executor when the target node is entered
    pub fn then_run<F, Fut>(&mut self, task: F) -> &mut Self
    where
        F: Fn(ExecContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ExecError>> + Send + 'static,
    {
        let task: ExecFn = Arc::new(move |ctx| task(ctx).boxed());
        self.push(Event::RunExec { task })
    }

    /// Deadline for `then_run` tasks on the target node
    pub fn with_timeout(&mut self, millis: u64) -> &mut Self {
        let id = self.current();
        self.graph.node_mut(id).wait_time = Duration::from_millis(millis);
        self
    }

    /// Label animated while `then_run` tasks on the target node execute
    pub fn with_loading_message(&mut self, message: impl Into<String>) -> &mut Self {
        let id = self.current();
        self.graph.node_mut(id).loading_message = message.into();
        self
    }

    /// Replace the target's instruction and build its options with `build`
    /// each time the target is entered
    pub fn then_branch<F>(&mut self, instruction: impl Into<String>, build: F) -> &mut Self
    where
        F: Fn(&mut FlowBuilder<'_>) + Send + Sync + 'static,
    {
        self.push(Event::Branch {
            instruction: instruction.into(),
            build: Arc::new(build),
        })
    }

    /// Register a named branch for later `go_to` calls
    pub fn branch<F>(&mut self, name: impl Into<String>, build: F) -> &mut Self
    where
        F: Fn(&mut FlowBuilder<'_>) + Send + Sync + 'static,
    {
        self.branches.insert(name, Arc::new(build));
        self
    }

    /// Like `then_branch` with a registered branch. An unknown name turns
    /// into a quit event that reports the missing branch.
    pub fn go_to(&mut self, name: impl Into<String>, instruction: impl Into<String>) -> &mut Self {
        let name = name.into();
        match self.branches.get(&name) {
            Some(build) => self.push(Event::GoTo {
                name,
                instruction: instruction.into(),
                build,
            }),
            None => {
                tracing::warn!(branch = %name, "go_to references an unknown branch");
                self.then_quit(format!("branch '{name}' not found"))
            }
        }
    }

    /// Display the text produced by `render` when the event fires
    pub fn then_display<F>(&mut self, render: F) -> &mut Self
    where
        F: Fn(&Answers) -> String + Send + Sync + 'static,
    {
        let render: DisplayFn = Arc::new(render);
        self.push(Event::Display { render })
    }

    /// End the session with a farewell message
    pub fn then_quit(&mut self, message: impl Into<String>) -> &mut Self {
        self.push(Event::Quit {
            message: message.into(),
        })
    }

    /// Ask for any non-empty line and store it as `key`
    pub fn ask(&mut self, question: impl Into<String>, key: impl Into<String>) -> &mut Self {
        self.ask_as(question, key, AnswerKind::Text)
    }

    /// Ask until the user enters an integer
    pub fn ask_for_int(&mut self, question: impl Into<String>, key: impl Into<String>) -> &mut Self {
        self.ask_as(question, key, AnswerKind::Integer)
    }

    /// Ask until the user enters a number
    pub fn ask_for_float(
        &mut self,
        question: impl Into<String>,
        key: impl Into<String>,
    ) -> &mut Self {
        self.ask_as(question, key, AnswerKind::Float)
    }

    fn ask_as(
        &mut self,
        question: impl Into<String>,
        key: impl Into<String>,
        kind: AnswerKind,
    ) -> &mut Self {
        self.push(Event::AskQuestion {
            question: question.into(),
            key: key.into(),
            kind,
        })
    }

    fn current(&self) -> NodeId {
        self.target.unwrap_or(self.base)
    }

    fn push(&mut self, event: Event) -> &mut Self {
        match (self.target, &mut self.scope) {
            (None, Scope::Branch { inline }) => inline.push(event),
            (target, _) => {
                let id = target.unwrap_or(self.base);
                self.graph.push_event(id, event);
            }
        }
        self
    }
}
