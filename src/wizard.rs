//! Host-facing entry point: configure a flow, then run it

use crate::config::SessionConfig;
use crate::console::{Console, TerminalConsole};
use crate::error::{ConfigError, ShellError};
use crate::flow::{BranchRegistry, FlowBuilder, FlowGraph};
use crate::input::{LineSource, StdinSource};
use crate::session::{ProductionSession, Session, SessionReport};

/// A wizard under construction.
///
/// Configuration errors are collected while building and reported by
/// [`Wizard::validate`]; no session starts while any are outstanding.
pub struct Wizard {
    config: SessionConfig,
    graph: FlowGraph,
    branches: BranchRegistry,
    errors: Vec<ConfigError>,
}

impl Wizard {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            graph: FlowGraph::new(config.default_wait),
            config,
            branches: BranchRegistry::default(),
            errors: Vec::new(),
        }
    }

    /// Builder positioned at the root node
    pub fn flow(&mut self) -> FlowBuilder<'_> {
        FlowBuilder::configure(&mut self.graph, &mut self.branches, &mut self.errors)
    }

    /// Build the flow in one closure
    #[must_use]
    pub fn configure<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut FlowBuilder<'_>),
    {
        build(&mut self.flow());
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// First configuration error, if any
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()?;
        match self.errors.first() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    pub fn into_session<S, C>(self, source: S, console: C) -> Result<Session<S, C>, ConfigError>
    where
        S: LineSource,
        C: Console,
    {
        self.validate()?;
        Session::new(self.config, self.graph, self.branches, source, console)
    }

    pub async fn run<S, C>(self, source: S, console: C) -> Result<SessionReport, ShellError>
    where
        S: LineSource,
        C: Console,
    {
        self.into_session(source, console)?.run().await
    }

    /// Run on stdin and the terminal, with Ctrl-C treated as `quit`
    pub async fn run_interactive(self) -> Result<SessionReport, ShellError> {
        self.validate()?;
        let session: ProductionSession =
            self.into_session(StdinSource::spawn()?, TerminalConsole::stdout())?;

        let handle = session.handle();
        let listener = tokio::spawn(async move {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => {
                        tracing::info!("Interrupt received");
                        handle.interrupt();
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to listen for interrupt"),
                },
                () = handle.closed() => {}
            }
        });

        let report = session.run().await;
        listener.abort();
        report
    }
}
