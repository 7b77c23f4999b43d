//! Timed executor with an animated progress indicator
//!
//! The guarded callback runs as a background task while the executor
//! re-renders its label with a rotating glyph. Whichever finishes first
//! (callback or deadline) decides the result. A timed-out callback is joined
//! before `run` returns; on shutdown it gets one tick to return and is then
//! aborted.

use crate::answers::Answers;
use crate::console::Console;
use crate::error::ExecError;
use crate::flow::ExecFn;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Glyph cycle of the progress indicator
pub const GLYPHS: [&str; 4] = ["/", "-", "\\", "|"];

const DEFAULT_LABEL: &str = "loading";

/// What a `RunExec` callback receives.
///
/// The callback is cooperative: it should watch [`ExecContext::cancelled`]
/// and return promptly once cancellation fires. It may also cancel itself.
#[derive(Debug, Clone)]
pub struct ExecContext {
    cancel: CancellationToken,
    answers: Answers,
}

impl ExecContext {
    pub fn new(cancel: CancellationToken, answers: Answers) -> Self {
        Self { cancel, answers }
    }

    /// Completes when the deadline passes or the session shuts down
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Explicit cancel trigger
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Snapshot of the session's answers when the task started
    pub fn answers(&self) -> &Answers {
        &self.answers
    }
}

/// Result of one guarded run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecReport {
    pub result: Result<(), ExecError>,
    /// Final line rendered by the indicator
    pub summary: String,
}

/// Deadline enforcement plus animation
#[derive(Debug, Clone)]
pub struct Jitter {
    tick: Duration,
}

impl Jitter {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Run `task` until it finishes, `deadline` worth of ticks elapse, or
    /// `shutdown` fires.
    pub async fn run<C>(
        &self,
        console: &mut C,
        deadline: Duration,
        label: &str,
        shutdown: &CancellationToken,
        answers: Answers,
        task: &ExecFn,
    ) -> ExecReport
    where
        C: Console + ?Sized,
    {
        let label = if label.is_empty() { DEFAULT_LABEL } else { label };
        let cancel = shutdown.child_token();
        let mut handle = tokio::spawn(task(ExecContext::new(cancel.clone(), answers)));

        let tick_ms = millis(self.tick);
        let deadline_ms = millis(deadline);
        let mut elapsed_ms: u64 = 0;
        let mut frame = 0usize;
        let mut ticker = interval_at(Instant::now() + self.tick, self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(label, deadline_ms, "Starting timed task");

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    cancel.cancel();
                    let summary = render(console, label, "...error");
                    self.reap(handle).await;
                    tracing::info!(label, "Timed task interrupted");
                    return ExecReport { result: Err(ExecError::Interrupted), summary };
                }

                joined = &mut handle => {
                    let result = flatten(joined);
                    let summary = render(console, label, "...done");
                    tracing::debug!(label, elapsed_ms, ok = result.is_ok(), "Timed task finished");
                    return ExecReport { result, summary };
                }

                _ = ticker.tick() => {
                    elapsed_ms = elapsed_ms.saturating_add(tick_ms);
                    render(console, label, GLYPHS[frame]);
                    frame = (frame + 1) % GLYPHS.len();

                    if elapsed_ms > deadline_ms {
                        cancel.cancel();
                        let summary = render(console, label, "...error");
                        let detail = match flatten(handle.await) {
                            Ok(()) => None,
                            Err(e) => Some(e.to_string()),
                        };
                        tracing::warn!(label, deadline_ms, ?detail, "Timed task exceeded its deadline");
                        return ExecReport {
                            result: Err(ExecError::Timeout { after_ms: deadline_ms, detail }),
                            summary,
                        };
                    }
                }
            }
        }
    }
}

impl Jitter {
    /// Give a cancelled task one tick to wind down, then abort it
    async fn reap(&self, mut handle: JoinHandle<Result<(), ExecError>>) {
        if tokio::time::timeout(self.tick, &mut handle).await.is_err() {
            tracing::warn!("Timed task ignored cancellation, aborting");
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TICK)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn flatten(joined: Result<Result<(), ExecError>, JoinError>) -> Result<(), ExecError> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(ExecError::Panicked),
        Err(_) => Err(ExecError::Interrupted),
    }
}

/// Animation frames are cosmetic; a failed write is logged, not propagated
fn render<C: Console + ?Sized>(console: &mut C, label: &str, suffix: &str) -> String {
    let text = format!("> {label} {suffix}");
    if let Err(e) = console.overwrite(&text) {
        tracing::warn!(error = %e, "Failed to render progress line");
    }
    text
}
