//! Background reader task owning the line source

use super::{classify, LineSource, Token};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What the session receives for one read request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Token(Token),
    EndOfStream,
    Interrupted,
}

type Request = oneshot::Sender<Option<Token>>;

/// Reads one line per request, so at most one read is ever outstanding.
///
/// The source lives on its own task and only talks to the session through
/// channels.
pub struct InputReader {
    requests: mpsc::Sender<Request>,
    task: JoinHandle<()>,
}

impl InputReader {
    pub fn spawn<S: LineSource>(source: S, shutdown: CancellationToken) -> Self {
        let (requests, request_rx) = mpsc::channel(1);
        let task = tokio::spawn(serve(source, request_rx, shutdown));
        Self { requests, task }
    }

    /// Request one line and wait for it, or for `shutdown`
    pub async fn next(&mut self, shutdown: &CancellationToken) -> ReadOutcome {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.requests.send(reply_tx).await.is_err() {
            return ReadOutcome::EndOfStream;
        }

        tokio::select! {
            biased;

            () = shutdown.cancelled() => ReadOutcome::Interrupted,
            reply = reply_rx => match reply {
                Ok(Some(token)) => ReadOutcome::Token(token),
                Ok(None) | Err(_) => ReadOutcome::EndOfStream,
            },
        }
    }

    /// Stop the reader task and wait for it
    pub async fn close(self) {
        drop(self.requests);
        self.task.abort();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                tracing::error!(error = %e, "Input reader panicked");
            }
        }
    }
}

async fn serve<S: LineSource>(
    mut source: S,
    mut requests: mpsc::Receiver<Request>,
    shutdown: CancellationToken,
) {
    loop {
        let reply = tokio::select! {
            () = shutdown.cancelled() => break,
            request = requests.recv() => match request {
                Some(reply) => reply,
                None => break,
            },
        };

        let line = tokio::select! {
            () = shutdown.cancelled() => break,
            line = source.read_line() => line,
        };

        let token = match line {
            Ok(Some(line)) => Some(classify(&line)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Input read failed, treating as end of stream");
                None
            }
        };
        let closed = token.is_none();
        // The requester may have given up on shutdown
        let _ = reply.send(token);
        if closed {
            break;
        }
    }
    tracing::debug!("Input reader stopped");
}
