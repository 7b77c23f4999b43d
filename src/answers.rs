//! Typed store for answers collected by `Ask*` events

use serde::Serialize;
use std::collections::HashMap;

/// What an `AskQuestion` event accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    Text,
    Integer,
    Float,
}

impl AnswerKind {
    /// Re-prompt shown when validation fails
    pub fn hint(self) -> Option<&'static str> {
        match self {
            AnswerKind::Text => None,
            AnswerKind::Integer => Some("> Please enter an integer e.g. 34"),
            AnswerKind::Float => Some("> Please enter a number e.g. 3.1415"),
        }
    }
}

/// Result of offering one line to a question
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validation {
    Accepted,
    /// Empty line: ask again without a hint
    Empty,
    Rejected { hint: &'static str },
}

/// Answers by key. Every accepted answer keeps its raw text; integer and
/// float answers are also stored parsed, so a stored zero is distinguishable
/// from a question that was never answered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Answers {
    strings: HashMap<String, String>,
    ints: HashMap<String, i64>,
    floats: HashMap<String, f64>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `input` as `kind` and store it under `key` on success
    pub fn submit(&mut self, key: &str, kind: AnswerKind, input: &str) -> Validation {
        if input.is_empty() {
            return Validation::Empty;
        }
        match kind {
            AnswerKind::Text => {}
            AnswerKind::Integer => match input.parse::<i64>() {
                Ok(value) => {
                    self.ints.insert(key.to_string(), value);
                }
                Err(_) => return Self::rejected(kind),
            },
            AnswerKind::Float => match input.parse::<f64>() {
                Ok(value) => {
                    self.floats.insert(key.to_string(), value);
                }
                Err(_) => return Self::rejected(kind),
            },
        }
        self.strings.insert(key.to_string(), input.to_string());
        Validation::Accepted
    }

    fn rejected(kind: AnswerKind) -> Validation {
        Validation::Rejected {
            hint: kind.hint().unwrap_or_default(),
        }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    pub fn int_value(&self, key: &str) -> Option<i64> {
        self.ints.get(key).copied()
    }

    pub fn float_value(&self, key: &str) -> Option<f64> {
        self.floats.get(key).copied()
    }
}
