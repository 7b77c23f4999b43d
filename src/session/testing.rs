//! Test doubles and session scenarios
//!
//! These drive whole sessions through in-memory input and output.

use super::{ExitReason, SessionHandle, SessionReport, SessionState};
use crate::config::SessionConfig;
use crate::console::MemoryConsole;
use crate::error::ShellError;
use crate::flow::FlowBuilder;
use crate::input::{BufSource, LineSource};
use crate::wizard::Wizard;
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ============================================================================
// Mock input
// ============================================================================

/// Line source fed by the test while the session runs
pub struct ChannelSource {
    lines: mpsc::UnboundedReceiver<String>,
}

impl ChannelSource {
    pub fn new() -> (mpsc::UnboundedSender<String>, Self) {
        let (tx, lines) = mpsc::unbounded_channel();
        (tx, Self { lines })
    }
}

#[async_trait]
impl LineSource for ChannelSource {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.recv().await)
    }
}

// ============================================================================
// Test session
// ============================================================================

/// Fast animation so timeouts don't slow the suite down
pub fn test_config() -> SessionConfig {
    SessionConfig::default().with_tick(Duration::from_millis(10))
}

/// Run a scripted session to completion
pub async fn run_script<F>(config: SessionConfig, script: &str, build: F) -> (SessionReport, MemoryConsole)
where
    F: FnOnce(&mut FlowBuilder<'_>),
{
    let console = MemoryConsole::new();
    let run = Wizard::new(config)
        .configure(build)
        .run(BufSource::from_script(script), console.clone());
    let report = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("session did not finish")
        .expect("session failed");
    (report, console)
}

/// A session running on its own task, fed line by line
pub struct TestSession {
    pub console: MemoryConsole,
    pub handle: SessionHandle,
    input: Option<mpsc::UnboundedSender<String>>,
    task: JoinHandle<Result<SessionReport, ShellError>>,
}

impl TestSession {
    pub fn start<F>(config: SessionConfig, build: F) -> Self
    where
        F: FnOnce(&mut FlowBuilder<'_>),
    {
        let console = MemoryConsole::new();
        let (input, source) = ChannelSource::new();
        let session = Wizard::new(config)
            .configure(build)
            .into_session(source, console.clone())
            .expect("invalid flow");
        let handle = session.handle();
        let task = tokio::spawn(session.run());

        Self {
            console,
            handle,
            input: Some(input),
            task,
        }
    }

    pub fn send(&self, line: &str) {
        if let Some(input) = &self.input {
            input.send(line.to_string()).expect("session input closed");
        }
    }

    pub fn close_input(&mut self) {
        self.input = None;
    }

    pub async fn wait_for_state(&mut self, expected: &SessionState, timeout: Duration) -> bool {
        self.handle.wait_for_state(|s| s == expected, timeout).await
    }

    /// Wait until the console shows a line containing `needle`
    pub async fn wait_for_output(&self, needle: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.console.contains(needle) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    pub async fn finish(self) -> SessionReport {
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("session did not finish")
            .expect("session task panicked")
            .expect("session failed")
    }
}

// ============================================================================
// Tests
// ============================================================================

mod tests {
    use super::*;
    use crate::error::{ConfigError, ExecError};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn yes_quits(flow: &mut FlowBuilder<'_>) {
        flow.first_instruction("run programme?")
            .if_user_inputs(["yes", "y", "Yes", "YES", "Y"])
            .default("yes")
            .then_quit("thank you");
    }

    fn quit(message: &str) -> ExitReason {
        ExitReason::Quit {
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_bad_command_keeps_position() {
        let (report, console) = run_script(test_config(), "bad_command\nY\n", yes_quits).await;

        assert_eq!(report.reason, quit("thank you"));
        assert!(console.contains("> unrecognised command 'bad_command'"));
        let prompt = "> run programme? [options: yes] (default 'yes')";
        assert_eq!(console.count(prompt), 2);
    }

    #[tokio::test]
    async fn test_exit_and_quit_terminate() {
        for word in ["exit", "quit"] {
            let (report, console) =
                run_script(test_config(), &format!("{word}\n"), yes_quits).await;
            assert_eq!(report.reason, ExitReason::Exit);
            assert_eq!(console.committed().last().map(String::as_str), Some("> exiting..."));
            assert_eq!(console.count("exiting..."), 1);
            assert!(!console.contains("thank you"));
        }
    }

    #[tokio::test]
    async fn test_greeting_is_framed_and_not_recorded() {
        let config = test_config().with_greeting(["Hello Test!", "version 1.0.0"]);
        let (report, console) = run_script(config, "exit\n", yes_quits).await;

        let lines = console.committed();
        assert_eq!(
            lines[..6],
            [
                "\t_____________",
                "",
                "\tHello Test!",
                "\tversion 1.0.0",
                "\t_____________",
                "",
            ]
        );
        assert!(!report.history.contains_output("Hello Test!"));
    }

    #[tokio::test]
    async fn test_branching() {
        let (report, console) = run_script(test_config(), "n\nyes\n", |flow| {
            flow.first_instruction("run programme?")
                .if_user_inputs(["yes", "y", "Yes", "YES", "Y"])
                .default("yes")
                .then_quit("thank you")
                .if_user_inputs(["no", "n", "NO", "N"])
                .then_branch("would you like to do anything else?", |b| {
                    b.if_user_inputs(["yes"])
                        .then_quit("that's all we can do though.")
                        .default("yes")
                        .if_user_inputs(["no"])
                        .then_quit("OK");
                });
        })
        .await;

        assert_eq!(report.reason, quit("that's all we can do though."));
        assert!(console.contains(
            "> would you like to do anything else? [options: yes, no] (default 'yes')"
        ));
        assert!(!console.contains("thank you"));
        assert!(console.contains("> exiting..."));
    }

    #[tokio::test]
    async fn test_gotos() {
        let (report, console) = run_script(test_config(), "one\nhello world!\n", |flow| {
            flow.first_instruction("run programme?")
                .branch("branch_one", |b| {
                    b.if_user_inputs(["hello world!"]).then_quit("hello");
                })
                .branch("branch_two", |b| {
                    b.if_user_inputs(["goodbye"]).then_quit("goodbye");
                })
                .if_user_inputs(["one"])
                .default("one")
                .go_to("branch_one", "you've entered branch one")
                .if_user_inputs(["branch_two"])
                .go_to("branch_two", "you've entered branch two");
        })
        .await;

        assert_eq!(report.reason, quit("hello"));
        assert!(console.contains("> you've entered branch one [options: hello world!]"));
    }

    #[tokio::test]
    async fn test_looping_go_to_keeps_graph_bounded() {
        let script = format!("{}stop\n", "again\n".repeat(300));
        let (report, console) = run_script(test_config(), &script, |flow| {
            flow.branch("loop", |b| {
                b.if_user_inputs(["again"])
                    .go_to("loop", "round again?")
                    .if_user_inputs(["stop"])
                    .then_quit("done");
            })
            .go_to("loop", "start?");
        })
        .await;

        assert_eq!(report.reason, quit("done"));
        assert!(console.contains("> round again? [options: again, stop]"));
        // 300 rounds would leave 602 nodes without reclamation
        assert!(report.graph.len() < 3 * crate::session::TRAIL_LIMIT);
    }

    #[tokio::test]
    async fn test_back_still_works_after_nodes_are_reclaimed() {
        let script = "again\nagain\nback\nback\nback\nback\nstop\n";
        let (report, console) = run_script(test_config(), script, |flow| {
            flow.branch("loop", |b| {
                b.if_user_inputs(["again"])
                    .go_to("loop", "round again?")
                    .if_user_inputs(["stop"])
                    .then_quit("done");
            })
            .go_to("loop", "start?");
        })
        .await;

        assert_eq!(report.reason, quit("done"));
        assert_eq!(console.count("> nothing to go back to"), 2);
    }

    #[tokio::test]
    async fn test_branch_reads_answers_collected_so_far() {
        let (report, console) = run_script(test_config(), "HAL\ngo\nHAL\n", |flow| {
            flow.ask("name?", "name")
                .if_user_inputs(["go"])
                .then_branch("pick", |b| {
                    let name = b.answers().value("name").unwrap_or("nobody").to_string();
                    b.if_user_inputs([name]).then_quit("recognised");
                });
        })
        .await;

        assert_eq!(report.reason, quit("recognised"));
        assert!(console.contains("> pick [options: HAL]"));
    }

    #[tokio::test]
    async fn test_missing_branch_quits_with_message() {
        let (report, console) = run_script(test_config(), "one\n", |flow| {
            flow.first_instruction("run programme?")
                .if_user_inputs(["one"])
                .default("one")
                .go_to("branch_one", "you've entered branch one")
                .if_user_inputs(["branch_two"])
                .go_to("branch_two", "you've entered branch two");
        })
        .await;

        assert_eq!(report.reason, quit("branch 'branch_one' not found"));
        assert!(console.contains("> branch 'branch_one' not found"));
        assert!(report.history.contains_output("branch 'branch_one' not found"));
    }

    #[tokio::test]
    async fn test_named_branch_is_rebuilt_on_each_visit() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let (report, _) = run_script(test_config(), "again\nagain\ndone\n", move |flow| {
            let counter = counter.clone();
            flow.branch("loop", move |b| {
                counter.fetch_add(1, Ordering::SeqCst);
                b.if_user_inputs(["again"])
                    .go_to("loop", "round again")
                    .if_user_inputs(["done"])
                    .then_quit("finished");
            })
            .first_instruction("start?")
            .if_user_inputs(["again"])
            .go_to("loop", "round one");
        })
        .await;

        assert_eq!(report.reason, quit("finished"));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_exec_with_default() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let (report, console) = run_script(
            test_config().with_greeting(["welcome to the test shell"]),
            "\n",
            move |flow| {
                let flag = flag.clone();
                flow.first_instruction("run programme?")
                    .if_user_inputs(["yes", "y", "Yes", "YES", "Y"])
                    .default("yes")
                    .then_run(move |ctx| {
                        let flag = flag.clone();
                        async move {
                            if ctx.is_cancelled() {
                                return Err(ExecError::failed("timeout (not expected)"));
                            }
                            flag.store(true, Ordering::SeqCst);
                            Ok(())
                        }
                    })
                    .with_loading_message("function loading")
                    .with_timeout(10_000)
                    .then_quit("thank you");
            },
        )
        .await;

        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(report.reason, quit("thank you"));
        assert!(console.contains("> function loading ...done"));
        assert!(report.history.contains_output("> function loading ...done"));
        // The default is echoed as if it had been typed
        assert!(console.committed().iter().any(|l| l == "yes"));
    }

    #[tokio::test]
    async fn test_run_exec_timeout_is_reported_and_session_continues() {
        let message: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let slot = message.clone();
        let (report, console) = run_script(test_config(), "\n", move |flow| {
            let slot = slot.clone();
            flow.first_instruction("run programme?")
                .if_user_inputs(["yes", "y"])
                .default("yes")
                .then_run(move |ctx| {
                    let slot = slot.clone();
                    async move {
                        tokio::select! {
                            () = tokio::time::sleep(Duration::from_secs(2)) => {
                                *slot.lock().unwrap() = Some("ran function".to_string());
                                Ok(())
                            }
                            () = ctx.cancelled() => Err(ExecError::failed("timeout (expected)")),
                        }
                    }
                })
                .with_loading_message("running...")
                .with_timeout(100)
                .then_quit("thank you");
        })
        .await;

        assert_eq!(*message.lock().unwrap(), None);
        assert_eq!(report.reason, quit("thank you"));
        assert!(console.contains("> running... ...error"));
        assert!(console.contains("timeout (expected)"));
        let error = report
            .history
            .iter()
            .find(|r| r.output.contains("timeout (expected)"))
            .unwrap();
        assert!(error.hidden);
        assert!(error.output.starts_with("> An error occurred (timed out after 100ms"));
    }

    #[tokio::test]
    async fn test_sentinel_errors_are_silent() {
        let (report, console) = run_script(test_config(), "go\n", |flow| {
            flow.if_user_inputs(["go"])
                .then_run(|_ctx| async { Err(ExecError::EndOfInput) })
                .then_run(|_ctx| async { Err(ExecError::BlankLine) })
                .then_quit("done");
        })
        .await;

        assert_eq!(report.reason, quit("done"));
        assert!(!console.contains("An error occurred"));
    }

    #[tokio::test]
    async fn test_ask_ignores_blank_lines() {
        let (report, console) = run_script(test_config(), "\n\n\nrobot\n", |flow| {
            flow.ask("are you a human?", "human")
                .if_user_inputs(["done"])
                .then_quit("bye");
        })
        .await;

        assert_eq!(report.answers.value("human"), Some("robot"));
        assert_eq!(console.count("> are you a human?"), 4);
        // Script ends while waiting for a command
        assert_eq!(report.reason, ExitReason::InputClosed);
    }

    #[tokio::test]
    async fn test_ask_does_not_take_node_default() {
        let (report, _) = run_script(test_config(), "\nHAL\nok\n", |flow| {
            flow.default("ok")
                .ask("name?", "name")
                .if_user_inputs(["ok"])
                .then_quit("bye");
        })
        .await;
        assert_eq!(report.answers.value("name"), Some("HAL"));
        assert_eq!(report.reason, quit("bye"));
    }

    #[tokio::test]
    async fn test_ask_for_int_retries_until_parseable() {
        let script = "I don't want any apples\n3.5\n0\n";
        let (report, console) = run_script(test_config(), script, |flow| {
            flow.ask_for_int("how many apples?", "apples");
        })
        .await;

        assert_eq!(console.count("> Please enter an integer e.g. 34"), 2);
        assert_eq!(report.answers.int_value("apples"), Some(0));
        assert_eq!(report.answers.int_value("pears"), None);
        assert_eq!(report.reason, ExitReason::Exhausted);
    }

    #[tokio::test]
    async fn test_ask_for_float_stores_exact_value() {
        let (report, console) = run_script(test_config(), "tall\n182.25\nex\n", |flow| {
            flow.ask_for_float("how tall are you (cm)?", "height")
                .if_user_inputs(["exitty", "e", "ex"])
                .then_quit("here");
        })
        .await;

        assert_eq!(console.count("> Please enter a number e.g. 3.1415"), 1);
        let height = report.answers.float_value("height").unwrap();
        assert_eq!(height.to_bits(), 182.25_f64.to_bits());
        assert_eq!(report.reason, quit("here"));
    }

    #[tokio::test]
    async fn test_display_reads_answers_when_fired() {
        let (report, console) = run_script(test_config(), "yes\nHAL\n", |flow| {
            flow.if_user_inputs(["yes"])
                .ask("what is your name?", "name")
                .then_display(|answers| {
                    format!("hello {}", answers.value("name").unwrap_or("stranger"))
                })
                .then_quit("bye");
        })
        .await;

        assert!(console.contains("> hello HAL"));
        assert!(!console.contains("stranger"));
        assert_eq!(report.reason, quit("bye"));
    }

    #[tokio::test]
    async fn test_capacity_one_keeps_second_display() {
        let config = test_config().with_buffer_size(1);
        let (report, _) = run_script(config, "", |flow| {
            flow.then_display(|_| "first".to_string())
                .then_display(|_| "second".to_string());
        })
        .await;

        assert_eq!(report.reason, ExitReason::Exhausted);
        let outputs: Vec<_> = report.history.iter().map(|r| r.output.as_str()).collect();
        assert_eq!(outputs, ["> second"]);
    }

    #[tokio::test]
    async fn test_empty_line_equals_default() {
        let build = |flow: &mut FlowBuilder<'_>| {
            flow.if_user_inputs(["yes"])
                .default("yes")
                .then_quit("took yes")
                .if_user_inputs(["no"])
                .then_quit("took no");
        };
        let (typed, _) = run_script(test_config(), "yes\n", build).await;
        let (empty, _) = run_script(test_config(), "\n", build).await;
        assert_eq!(typed.reason, empty.reason);
        assert_eq!(empty.reason, quit("took yes"));
    }

    #[tokio::test]
    async fn test_recall_resubmits_last_input() {
        let (report, console) = run_script(test_config(), "nope\n\x1b[A\ngo\n", |flow| {
            flow.if_user_inputs(["go"]).then_quit("gone");
        })
        .await;

        assert_eq!(console.count("> unrecognised command 'nope'"), 2);
        assert_eq!(report.reason, quit("gone"));
    }

    #[tokio::test]
    async fn test_unknown_escape_sequence_is_ignored() {
        let (report, console) = run_script(test_config(), "\x1b[D\ngo\n", |flow| {
            flow.if_user_inputs(["go"]).then_quit("gone");
        })
        .await;
        assert!(!console.contains("unrecognised"));
        assert_eq!(report.reason, quit("gone"));
    }

    #[tokio::test]
    async fn test_back_and_run_exec_at_most_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let script = "install\nback\nback\ninstall\nfinish\n";
        let (report, console) = run_script(test_config(), script, move |flow| {
            let counter = counter.clone();
            flow.first_instruction("menu")
                .if_user_inputs(["install"])
                .then_run(move |_ctx| {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .then_branch("installed", |b| {
                    b.if_user_inputs(["finish"]).then_quit("all done");
                });
        })
        .await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(console.count("> nothing to go back to"), 1);
        assert_eq!(console.count("> installed [options: finish]"), 2);
        assert_eq!(report.reason, quit("all done"));
    }

    #[tokio::test]
    async fn test_branch_inline_events_run_once_per_visit() {
        let (report, console) = run_script(test_config(), "n\nback\nn\nstop\n", |flow| {
            flow.if_user_inputs(["n"]).then_branch("inside", |b| {
                b.then_display(|_| "entered".to_string())
                    .if_user_inputs(["stop"])
                    .then_quit("stopped");
            });
        })
        .await;

        assert_eq!(console.count("> entered"), 2);
        assert_eq!(report.reason, quit("stopped"));
    }

    #[tokio::test]
    async fn test_config_error_inside_branch_ends_session() {
        let console = MemoryConsole::new();
        let result = Wizard::new(test_config())
            .configure(|flow| {
                flow.if_user_inputs(["go"]).then_branch("oops", |b| {
                    b.if_user_inputs(["quit"]).then_quit("never");
                });
            })
            .run(BufSource::from_script("go\n"), console.clone())
            .await;

        assert!(matches!(
            result,
            Err(ShellError::Config(ConfigError::ReservedWord { .. }))
        ));
    }

    #[tokio::test]
    async fn test_end_of_input_closes_session() {
        let (report, console) = run_script(test_config(), "", yes_quits).await;
        assert_eq!(report.reason, ExitReason::InputClosed);
        assert_eq!(console.count("> exiting..."), 1);
    }

    #[tokio::test]
    async fn test_partial_last_line_is_end_of_stream() {
        let (report, _) = run_script(test_config(), "yes", yes_quits).await;
        assert_eq!(report.reason, ExitReason::InputClosed);
    }

    #[tokio::test]
    async fn test_interactive_input_and_state() {
        let mut session = TestSession::start(test_config(), |flow| {
            flow.if_user_inputs(["name"])
                .ask("what is your name?", "name")
                .then_quit("bye");
        });

        assert!(
            session
                .wait_for_state(&SessionState::AwaitingCommand, Duration::from_secs(2))
                .await
        );
        session.send("name");
        let answering = SessionState::AwaitingAnswer {
            key: "name".to_string(),
        };
        assert!(session.wait_for_state(&answering, Duration::from_secs(2)).await);
        session.send("HAL");

        let report = session.finish().await;
        assert_eq!(report.answers.value("name"), Some("HAL"));
        assert_eq!(report.reason, quit("bye"));
    }

    #[tokio::test]
    async fn test_interrupt_while_waiting_for_input() {
        let mut session = TestSession::start(test_config(), yes_quits);
        assert!(
            session
                .wait_for_state(&SessionState::AwaitingCommand, Duration::from_secs(2))
                .await
        );
        session.handle.interrupt();

        let console = session.console.clone();
        let report = session.finish().await;
        assert_eq!(report.reason, ExitReason::Interrupted);
        assert_eq!(console.count("> exiting..."), 1);
    }

    #[tokio::test]
    async fn test_interrupt_cancels_running_task() {
        let observed = Arc::new(AtomicBool::new(false));
        let flag = observed.clone();
        let mut session = TestSession::start(test_config(), move |flow| {
            let flag = flag.clone();
            flow.if_user_inputs(["run"])
                .then_run(move |ctx| {
                    let flag = flag.clone();
                    async move {
                        ctx.cancelled().await;
                        flag.store(true, Ordering::SeqCst);
                        Err(ExecError::failed("cancelled"))
                    }
                })
                .with_timeout(60_000)
                .then_quit("never reached");
        });

        session.send("run");
        assert!(
            session
                .wait_for_state(&SessionState::Executing, Duration::from_secs(2))
                .await
        );
        session.handle.interrupt();

        let console = session.console.clone();
        let report = session.finish().await;
        assert_eq!(report.reason, ExitReason::Interrupted);
        assert!(observed.load(Ordering::SeqCst));
        assert!(!console.contains("never reached"));
        assert_eq!(console.count("> exiting..."), 1);
    }

    #[tokio::test]
    async fn test_interrupt_ends_session_when_task_returns_ok() {
        let mut session = TestSession::start(test_config(), |flow| {
            flow.if_user_inputs(["run"])
                .then_run(|ctx| async move {
                    ctx.cancelled().await;
                    Ok(())
                })
                .with_timeout(60_000)
                .then_display(|_| "after task".to_string())
                .then_quit("never reached");
        });

        session.send("run");
        assert!(
            session
                .wait_for_state(&SessionState::Executing, Duration::from_secs(2))
                .await
        );
        session.handle.interrupt();

        let console = session.console.clone();
        let report = session.finish().await;
        assert_eq!(report.reason, ExitReason::Interrupted);
        assert!(!console.contains("after task"));
        assert!(!console.contains("never reached"));
        assert!(console.contains("> loading ...error"));
    }

    #[tokio::test]
    async fn test_interrupt_does_not_wait_for_task_ignoring_cancellation() {
        let mut session = TestSession::start(test_config(), |flow| {
            flow.if_user_inputs(["run"])
                .then_run(|_ctx| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    Ok(())
                })
                .with_timeout(60_000)
                .then_quit("never reached");
        });

        session.send("run");
        assert!(
            session
                .wait_for_state(&SessionState::Executing, Duration::from_secs(2))
                .await
        );
        let started = std::time::Instant::now();
        session.handle.interrupt();

        let report = session.finish().await;
        assert_eq!(report.reason, ExitReason::Interrupted);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_closing_channel_input_ends_session() {
        let mut session = TestSession::start(test_config(), yes_quits);
        assert!(session.wait_for_output("run programme?", Duration::from_secs(2)).await);
        session.close_input();
        let report = session.finish().await;
        assert_eq!(report.reason, ExitReason::InputClosed);
    }

    #[tokio::test]
    async fn test_transcript_written_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        let config = test_config().with_transcript(&path);
        let (report, _) = run_script(config, "bad\nyes\n", yes_quits).await;
        assert_eq!(report.reason, quit("thank you"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let records: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), report.history.len());
        assert_eq!(
            records[0]["output"],
            "> run programme? [options: yes] (default 'yes')"
        );
        assert_eq!(records.last().unwrap()["output"], "> thank you");
        assert!(records.iter().all(|r| r["timestamp"].is_string()));
    }
}
