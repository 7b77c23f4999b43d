//! Pure command resolution
//!
//! Given the current node and a submitted line, decide what the session
//! does next. No I/O and no session mutation happens here.

use crate::error::{BACK, EXIT, QUIT};
use crate::flow::{FlowNode, NodeId};
use crate::input::Token;

/// What a command submission means at the current node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// `exit` or `quit`
    Terminate,
    /// Return to the previously visited node
    Back,
    /// Nothing submitted: prompt again silently
    Retry,
    /// Move to a child and run its events
    Enter(NodeId),
    Unrecognised(String),
}

/// A line after recall and default substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    /// Substituted by the engine, so it is echoed as if typed
    pub echoed: bool,
}

impl Submission {
    fn typed(text: String) -> Self {
        Self {
            text,
            echoed: false,
        }
    }

    fn echoed(text: &str) -> Self {
        Self {
            text: text.to_string(),
            echoed: true,
        }
    }
}

pub fn resolve_command(node: &FlowNode, text: &str) -> Resolution {
    match text {
        "" => Resolution::Retry,
        EXIT | QUIT => Resolution::Terminate,
        BACK => Resolution::Back,
        _ => node
            .child(text)
            .map_or_else(|| Resolution::Unrecognised(text.to_string()), Resolution::Enter),
    }
}

/// Substitute recall and defaults.
///
/// A recall with nothing to recall behaves like an empty line. Defaults only
/// apply in command mode; in answer mode an empty line stays empty.
pub fn resolve_token(
    token: Token,
    recalled: &str,
    default: Option<&str>,
    answering: bool,
) -> Submission {
    match token {
        Token::Text(text) => Submission::typed(text),
        Token::Recall if !recalled.is_empty() => Submission::echoed(recalled),
        Token::Recall | Token::Empty => match default {
            Some(default) if !answering && !default.is_empty() => Submission::echoed(default),
            _ => Submission::typed(String::new()),
        },
    }
}

/// `> {instruction} [options: a, b] (default 'a')`, or `None` when the node
/// has nothing to choose from
pub fn prompt_text(node: &FlowNode) -> Option<String> {
    if !node.has_children() {
        return None;
    }
    let mut prompt = String::from(">");
    if !node.instruction.is_empty() {
        prompt.push(' ');
        prompt.push_str(&node.instruction);
    }
    prompt.push_str(" [options: ");
    prompt.push_str(&node.options().join(", "));
    prompt.push(']');
    if let Some(default) = node.default.as_deref().filter(|d| !d.is_empty()) {
        prompt.push_str(&format!(" (default '{default}')"));
    }
    Some(prompt)
}
