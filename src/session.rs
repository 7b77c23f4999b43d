//! Session loop
//!
//! Owns the flow graph, the cursor into it, the answers and the history.
//! Background work (the input reader, timed callbacks, the interrupt
//! listener) talks to the loop only through channels and the shutdown
//! token, so every piece of session state has exactly one writer.

mod state;
pub(crate) mod transition;

#[cfg(test)]
pub(crate) mod testing;

pub use state::{ExitReason, SessionReport, SessionState};
pub use transition::{prompt_text, resolve_command, resolve_token, Resolution, Submission};

use crate::answers::{AnswerKind, Answers, Validation};
use crate::config::SessionConfig;
use crate::console::{Console, TerminalConsole};
use crate::error::{ConfigError, ShellError};
use crate::flow::{BranchFn, BranchRegistry, Event, ExecFn, FlowBuilder, FlowGraph, NodeId};
use crate::history::HistoryBuffer;
use crate::input::{InputReader, LineSource, ReadOutcome, StdinSource, Token};
use crate::jitter::Jitter;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

/// How many visited nodes `back` can return through
const TRAIL_LIMIT: usize = 64;

/// Session reading stdin and writing to the terminal
pub type ProductionSession = Session<StdinSource, TerminalConsole>;

/// Control surface for a running session
#[derive(Clone)]
pub struct SessionHandle {
    shutdown: CancellationToken,
    state: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Treated exactly like the user typing `quit`, at any point
    pub fn interrupt(&self) {
        self.shutdown.cancel();
    }

    /// Resolves once the session is shutting down
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Wait until the session reaches a state matching `predicate`
    pub async fn wait_for_state<F>(&mut self, predicate: F, timeout: Duration) -> bool
    where
        F: FnMut(&SessionState) -> bool,
    {
        matches!(
            tokio::time::timeout(timeout, self.state.wait_for(predicate)).await,
            Ok(Ok(_))
        )
    }
}

/// One run of a wizard over an input source and a console
pub struct Session<S, C> {
    source: S,
    core: SessionCore<C>,
}

impl<S: LineSource, C: Console> Session<S, C> {
    pub fn new(
        config: SessionConfig,
        graph: FlowGraph,
        branches: BranchRegistry,
        source: S,
        console: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (state_tx, _) = watch::channel(SessionState::Greeting);
        let core = SessionCore {
            id: Uuid::new_v4(),
            history: HistoryBuffer::new(config.buffer_size),
            jitter: Jitter::new(config.tick),
            config,
            graph,
            branches,
            answers: Answers::new(),
            console,
            current: NodeId::ROOT,
            trail: VecDeque::new(),
            state_tx,
            shutdown: CancellationToken::new(),
        };
        Ok(Self { source, core })
    }

    pub fn id(&self) -> Uuid {
        self.core.id
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shutdown: self.core.shutdown.clone(),
            state: self.core.state_tx.subscribe(),
        }
    }

    /// Greet, then drive the graph until a terminal condition
    pub async fn run(self) -> Result<SessionReport, ShellError> {
        let Session { source, core } = self;
        core.run(source).await
    }
}

/// Outcome of dispatching one event
enum Step {
    Next,
    /// Events to run immediately, ahead of the rest of the node's sequence
    Splice(Vec<Event>),
    Stop(ExitReason),
}

struct SessionCore<C> {
    id: Uuid,
    config: SessionConfig,
    graph: FlowGraph,
    branches: BranchRegistry,
    answers: Answers,
    history: HistoryBuffer,
    jitter: Jitter,
    console: C,
    current: NodeId,
    /// Previously visited nodes, for `back`; oldest dropped past `TRAIL_LIMIT`
    trail: VecDeque<NodeId>,
    state_tx: watch::Sender<SessionState>,
    shutdown: CancellationToken,
}

impl<C: Console> SessionCore<C> {
    async fn run<S: LineSource>(mut self, source: S) -> Result<SessionReport, ShellError> {
        tracing::info!(session_id = %self.id, nodes = self.graph.len(), "Starting session");

        let mut reader = InputReader::spawn(source, self.shutdown.clone());
        let outcome = match self.greet() {
            Ok(()) => self.drive(&mut reader).await,
            Err(e) => Err(e),
        };

        self.shutdown.cancel();
        reader.close().await;
        self.set_state(SessionState::Terminated);

        let reason = match outcome {
            Ok(reason) => reason,
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "Session failed");
                return Err(e);
            }
        };

        self.console
            .line(&format!("> {}", self.config.exit_message))?;
        self.write_transcript().await?;

        tracing::info!(session_id = %self.id, ?reason, "Session ended");
        Ok(SessionReport {
            reason,
            answers: self.answers,
            history: self.history,
            graph: self.graph,
        })
    }

    async fn drive(&mut self, reader: &mut InputReader) -> Result<ExitReason, ShellError> {
        if let Some(reason) = self.visit(NodeId::ROOT, reader).await? {
            return Ok(reason);
        }

        loop {
            let node = self.graph.node(self.current);
            if !node.has_children() {
                return Ok(ExitReason::Exhausted);
            }
            let prompt = prompt_text(node);

            self.set_state(SessionState::AwaitingCommand);
            if let Some(prompt) = prompt {
                self.emit("", &prompt)?;
            }

            let token = match reader.next(&self.shutdown).await {
                ReadOutcome::Token(token) => token,
                ReadOutcome::EndOfStream => return Ok(ExitReason::InputClosed),
                ReadOutcome::Interrupted => return Ok(ExitReason::Interrupted),
            };
            let text = self.submit(token, false)?;

            match resolve_command(self.graph.node(self.current), &text) {
                Resolution::Terminate => return Ok(ExitReason::Exit),
                Resolution::Retry => {}
                Resolution::Back => self.back()?,
                Resolution::Unrecognised(command) => {
                    tracing::debug!(session_id = %self.id, %command, "Unrecognised command");
                    self.emit("", &format!("> unrecognised command '{command}'"))?;
                }
                Resolution::Enter(child) => {
                    self.trail.push_back(self.current);
                    if self.trail.len() > TRAIL_LIMIT {
                        self.trail.pop_front();
                    }
                    if let Some(reason) = self.visit(child, reader).await? {
                        return Ok(reason);
                    }
                }
            }
        }
    }

    /// Move the cursor to `id` and run its event sequence in order
    async fn visit(
        &mut self,
        id: NodeId,
        reader: &mut InputReader,
    ) -> Result<Option<ExitReason>, ShellError> {
        self.current = id;
        let node = self.graph.node(id);
        let already_executed = node.executed();
        tracing::debug!(
            session_id = %self.id,
            node = ?id,
            token = node.token.as_deref().unwrap_or("<root>"),
            events = node.events().len(),
            "Visiting node"
        );

        let mut inline: VecDeque<Event> = VecDeque::new();
        let mut index = 0;
        loop {
            let event = match inline.pop_front() {
                Some(event) => event,
                None => match self.graph.event(id, index) {
                    Some(event) => {
                        index += 1;
                        event.clone()
                    }
                    None => return Ok(None),
                },
            };

            match self.dispatch(id, event, already_executed, reader).await? {
                Step::Next => {}
                Step::Splice(events) => {
                    for event in events.into_iter().rev() {
                        inline.push_front(event);
                    }
                }
                Step::Stop(reason) => return Ok(Some(reason)),
            }
        }
    }

    async fn dispatch(
        &mut self,
        id: NodeId,
        event: Event,
        already_executed: bool,
        reader: &mut InputReader,
    ) -> Result<Step, ShellError> {
        match event {
            Event::RunExec { task } => {
                if already_executed {
                    tracing::debug!(session_id = %self.id, node = ?id, "Skipping completed task");
                    return Ok(Step::Next);
                }
                self.run_exec(id, &task).await
            }
            Event::Branch { instruction, build } => self.branch(id, instruction, &build),
            Event::GoTo {
                name,
                instruction,
                build,
            } => {
                tracing::debug!(session_id = %self.id, branch = %name, "Entering named branch");
                self.branch(id, instruction, &build)
            }
            Event::Display { render } => {
                let text = format!("> {}", render(&self.answers));
                self.emit("", &text)?;
                Ok(Step::Next)
            }
            Event::AskQuestion {
                question,
                key,
                kind,
            } => self.ask(&question, &key, kind, reader).await,
            Event::Quit { message } => {
                self.emit("", &format!("> {message}"))?;
                Ok(Step::Stop(ExitReason::Quit { message }))
            }
        }
    }

    async fn run_exec(&mut self, id: NodeId, task: &ExecFn) -> Result<Step, ShellError> {
        self.set_state(SessionState::Executing);
        let node = self.graph.node(id);
        let deadline = node.wait_time;
        let label = node.loading_message.clone();

        let report = self
            .jitter
            .run(
                &mut self.console,
                deadline,
                &label,
                &self.shutdown,
                self.answers.clone(),
                task,
            )
            .await;
        self.graph.mark_executed(id);
        self.history.record("", report.summary, false);
        self.set_state(SessionState::AwaitingCommand);

        if self.shutdown.is_cancelled() {
            tracing::debug!(session_id = %self.id, result = ?report.result, "Interrupted while executing");
            return Ok(Step::Stop(ExitReason::Interrupted));
        }
        match report.result {
            Ok(()) => Ok(Step::Next),
            Err(e) if e.is_silent() => {
                tracing::debug!(session_id = %self.id, error = %e, "Task returned a sentinel");
                Ok(Step::Next)
            }
            Err(e) => {
                tracing::info!(session_id = %self.id, error = %e, "Task failed");
                self.emit_hidden(&format!("> An error occurred ({e})"))?;
                Ok(Step::Next)
            }
        }
    }

    /// Replace the node's instruction and let `build` extend the graph at it
    fn branch(&mut self, id: NodeId, instruction: String, build: &BranchFn) -> Result<Step, ShellError> {
        self.graph.node_mut(id).instruction = instruction;

        let mut errors = Vec::new();
        let mut builder = FlowBuilder::branch_scope(
            &mut self.graph,
            &mut self.branches,
            &self.answers,
            &mut errors,
            id,
        );
        build(&mut builder);
        let inline = builder.into_inline();

        if let Some(error) = errors.into_iter().next() {
            return Err(error.into());
        }

        let roots = self.trail.iter().copied().chain([self.current]);
        let freed = self.graph.retain_reachable(roots);
        if freed > 0 {
            tracing::debug!(session_id = %self.id, freed, live = self.graph.len(), "Reclaimed unreachable nodes");
        }
        Ok(Step::Splice(inline))
    }

    /// Re-ask until the answer validates as `kind`
    async fn ask(
        &mut self,
        question: &str,
        key: &str,
        kind: AnswerKind,
        reader: &mut InputReader,
    ) -> Result<Step, ShellError> {
        self.set_state(SessionState::AwaitingAnswer {
            key: key.to_string(),
        });
        let prompt = format!("> {question}");

        loop {
            self.emit("", &prompt)?;
            let token = match reader.next(&self.shutdown).await {
                ReadOutcome::Token(token) => token,
                ReadOutcome::EndOfStream => return Ok(Step::Stop(ExitReason::InputClosed)),
                ReadOutcome::Interrupted => return Ok(Step::Stop(ExitReason::Interrupted)),
            };
            let text = self.submit(token, true)?;

            match self.answers.submit(key, kind, &text) {
                Validation::Accepted => break,
                Validation::Empty => {}
                Validation::Rejected { hint } => self.emit("", hint)?,
            }
        }

        tracing::debug!(session_id = %self.id, %key, ?kind, "Answer stored");
        self.set_state(SessionState::AwaitingCommand);
        Ok(Step::Next)
    }

    fn back(&mut self) -> Result<(), ShellError> {
        match self.trail.pop_back() {
            Some(previous) => {
                tracing::debug!(session_id = %self.id, from = ?self.current, to = ?previous, "Going back");
                self.current = previous;
                Ok(())
            }
            None => self.emit("", "> nothing to go back to"),
        }
    }

    /// Apply recall and default substitution, echoing substituted text
    fn submit(&mut self, token: Token, answering: bool) -> Result<String, ShellError> {
        let default = self.graph.node(self.current).default.clone();
        let submission = resolve_token(token, self.history.recall(), default.as_deref(), answering);

        if submission.echoed {
            self.emit(&submission.text, &submission.text)?;
        } else if !submission.text.is_empty() {
            self.history.record(submission.text.as_str(), "", false);
        }
        Ok(submission.text)
    }

    fn greet(&mut self) -> Result<(), ShellError> {
        if self.config.greeting.is_empty() {
            return Ok(());
        }
        let width = self
            .config
            .greeting
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or_default();
        let rule = format!("\t{}", "_".repeat(width));

        self.console.line(&rule)?;
        self.console.line("")?;
        for line in &self.config.greeting {
            self.console.line(&format!("\t{line}"))?;
        }
        self.console.line(&rule)?;
        self.console.line("")?;
        Ok(())
    }

    fn emit(&mut self, input: &str, output: &str) -> Result<(), ShellError> {
        self.history.record(input, output, false);
        self.console.line(output)?;
        Ok(())
    }

    /// Shown but never offered for recall
    fn emit_hidden(&mut self, output: &str) -> Result<(), ShellError> {
        self.history.record("", output, true);
        self.console.line(output)?;
        Ok(())
    }

    fn set_state(&mut self, state: SessionState) {
        let previous = self.state_tx.send_replace(state);
        let current = self.state_tx.borrow();
        if previous != *current {
            tracing::debug!(session_id = %self.id, from = ?previous, to = ?*current, "State changed");
        }
    }

    async fn write_transcript(&self) -> Result<(), ShellError> {
        let Some(path) = &self.config.transcript_path else {
            return Ok(());
        };
        let lines = self.history.to_json_lines()?;
        tokio::fs::write(path, lines).await?;
        tracing::info!(
            session_id = %self.id,
            path = %path.display(),
            records = self.history.len(),
            "Transcript written"
        );
        Ok(())
    }
}
