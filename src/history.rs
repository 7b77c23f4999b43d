//! Bounded, most-recent-first record of session input and output


use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// One committed line of the session transcript
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    /// What the user submitted (empty for engine output)
    pub input: String,
    /// What was displayed
    pub output: String,
    pub timestamp: DateTime<Utc>,
    /// Hidden records are never offered for recall
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl HistoryRecord {
    pub fn new(input: impl Into<String>, output: impl Into<String>, hidden: bool) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            timestamp: Utc::now(),
            hidden,
        }
    }
}

/// Ring of the last `capacity` records, newest at the front.
///
/// Append/evict only: records are never edited in place.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    records: VecDeque<HistoryRecord>,
    capacity: usize,
}

impl HistoryBuffer {
    /// A zero capacity is clamped to 1; `SessionConfig::validate` rejects it earlier.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a record to the front, evicting the oldest one past capacity
    pub fn record(&mut self, input: impl Into<String>, output: impl Into<String>, hidden: bool) {
        self.push(HistoryRecord::new(input, output, hidden));
    }

    pub fn push(&mut self, record: HistoryRecord) {
        self.records.push_front(record);
        while self.records.len() > self.capacity {
            self.records.pop_back();
        }
    }

    /// Most recent non-hidden input that isn't empty, or `""`
    pub fn recall(&self) -> &str {
        self.records
            .iter()
            .find(|r| !r.hidden && !r.input.is_empty())
            .map_or("", |r| r.input.as_str())
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether any displayed line contains `needle`
    pub fn contains_output(&self, needle: &str) -> bool {
        self.records.iter().any(|r| r.output.contains(needle))
    }

    /// Oldest-first JSON lines, one record per line
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in self.records.iter().rev() {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BUFFER_SIZE)
    }
}
