//! Input boundary: line sources and token classification
//!
//! A [`LineSource`] yields raw lines. [`classify`] turns each one into a
//! [`Token`]; resolving recall and defaults needs session state and
//! happens in the session loop.

mod reader;

pub use reader::{InputReader, ReadOutcome};

use async_trait::async_trait;
use std::io::{self, BufRead};
use std::sync::mpsc as std_mpsc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// Escape prefix of a terminal control sequence (`ESC [`)
const CSI: &str = "\x1b[";
/// Final byte of the arrow-up sequence, used as "recall previous input"
const RECALL: u8 = b'A';

/// Byte-oriented source of newline-terminated lines
#[async_trait]
pub trait LineSource: Send + 'static {
    /// Next line without its terminator. `None` at end of stream; a final
    /// line that lacks a newline counts as end of stream.
    async fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// One submitted line after classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    /// Re-submit the last recorded input
    Recall,
    /// Blank line, bare carriage return or an unrecognised control sequence
    Empty,
}

/// Remove embedded newlines, tabs and carriage returns, then surrounding spaces
pub fn sanitize(line: &str) -> String {
    let stripped: String = line
        .chars()
        .filter(|c| !matches!(c, '\n' | '\t' | '\r'))
        .collect();
    stripped.trim_matches(' ').to_string()
}

pub fn classify(line: &str) -> Token {
    let clean = sanitize(line);
    if let Some(rest) = clean.strip_prefix(CSI) {
        return match rest.as_bytes().first() {
            Some(&RECALL) => Token::Recall,
            Some(_) => Token::Empty,
            None => Token::Text(clean),
        };
    }
    if clean.is_empty() {
        Token::Empty
    } else {
        Token::Text(clean)
    }
}

/// Lines from any buffered async reader
pub struct BufSource<R> {
    reader: R,
}

impl<R: AsyncBufRead + Unpin + Send + 'static> BufSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl BufSource<io::Cursor<Vec<u8>>> {
    /// Pre-recorded input, one line per `\n`
    pub fn from_script(script: &str) -> Self {
        Self::new(io::Cursor::new(script.as_bytes().to_vec()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send + 'static> LineSource for BufSource<R> {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 || !line.ends_with('\n') {
            return Ok(None);
        }
        line.pop();
        Ok(Some(line))
    }
}

/// Interactive stdin.
///
/// Blocking reads run on a dedicated thread that reads one line per
/// request, so a pending read never holds up runtime shutdown.
pub struct StdinSource {
    requests: std_mpsc::Sender<()>,
    lines: mpsc::Receiver<io::Result<Option<String>>>,
}

impl StdinSource {
    pub fn spawn() -> io::Result<Self> {
        let (request_tx, request_rx) = std_mpsc::channel::<()>();
        let (line_tx, line_rx) = mpsc::channel(1);

        std::thread::Builder::new()
            .name("flowshell-stdin".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                while request_rx.recv().is_ok() {
                    let mut line = String::new();
                    let result = match stdin.lock().read_line(&mut line) {
                        Ok(0) => Ok(None),
                        Ok(_) if !line.ends_with('\n') => Ok(None),
                        Ok(_) => {
                            line.pop();
                            Ok(Some(line))
                        }
                        Err(e) => Err(e),
                    };
                    let done = !matches!(result, Ok(Some(_)));
                    if line_tx.blocking_send(result).is_err() || done {
                        break;
                    }
                }
            })?;

        Ok(Self {
            requests: request_tx,
            lines: line_rx,
        })
    }
}

#[async_trait]
impl LineSource for StdinSource {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        if self.requests.send(()).is_err() {
            return Ok(None);
        }
        Ok(self.lines.recv().await.transpose()?.flatten())
    }
}
