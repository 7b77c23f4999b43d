//! Output boundary: committed lines and a single overwritable progress line

use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Where the session writes what the user sees
pub trait Console: Send {
    /// Append a committed line
    fn line(&mut self, text: &str) -> io::Result<()>;

    /// Replace the current progress line
    fn overwrite(&mut self, text: &str) -> io::Result<()>;
}

/// Terminal writer. A pending overwrite line is terminated before the next
/// committed line, so the two modes never share a line.
pub struct TerminalConsole<W: Write + Send = Stdout> {
    out: W,
    overwriting: bool,
}

impl TerminalConsole<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalConsole<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            overwriting: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Console for TerminalConsole<W> {
    fn line(&mut self, text: &str) -> io::Result<()> {
        if self.overwriting {
            self.out.write_all(b"\n")?;
            self.overwriting = false;
        }
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    fn overwrite(&mut self, text: &str) -> io::Result<()> {
        self.out
            .queue(MoveToColumn(0))?
            .queue(Clear(ClearType::CurrentLine))?
            .queue(Print(text))?;
        self.overwriting = true;
        self.out.flush()
    }
}

/// What a [`MemoryConsole`] received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    Line(String),
    Overwrite(String),
}

impl ConsoleLine {
    pub fn text(&self) -> &str {
        match self {
            ConsoleLine::Line(text) | ConsoleLine::Overwrite(text) => text,
        }
    }
}

/// In-memory console for tests and embedding; clones share one log
#[derive(Debug, Clone, Default)]
pub struct MemoryConsole {
    lines: Arc<Mutex<Vec<ConsoleLine>>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Committed lines only
    pub fn committed(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| match l {
                ConsoleLine::Line(text) => Some(text),
                ConsoleLine::Overwrite(_) => None,
            })
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.text().contains(needle))
    }

    /// Number of lines (of either kind) containing `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.lines()
            .iter()
            .filter(|l| l.text().contains(needle))
            .count()
    }

    fn push(&self, line: ConsoleLine) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }
}

impl Console for MemoryConsole {
    fn line(&mut self, text: &str) -> io::Result<()> {
        self.push(ConsoleLine::Line(text.to_string()));
        Ok(())
    }

    fn overwrite(&mut self, text: &str) -> io::Result<()> {
        self.push(ConsoleLine::Overwrite(text.to_string()));
        Ok(())
    }
}
