//! Arena of flow nodes

use super::Event;
use crate::error::{is_reserved, ConfigError};
use std::collections::HashMap;
use std::time::Duration;

/// Position in a [`FlowGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// One wizard state: a prompt, its options, its default and its events
#[derive(Debug, Clone)]
pub struct FlowNode {
    /// Primary token that leads here; `None` for the root
    pub token: Option<String>,
    pub instruction: String,
    /// Substituted when the user submits an empty line
    pub default: Option<String>,
    /// Deadline for `RunExec` events on this node
    pub wait_time: Duration,
    pub loading_message: String,
    /// Primary tokens in display order
    commands: Vec<String>,
    children: HashMap<String, NodeId>,
    events: Vec<Event>,
    executed: bool,
}

impl FlowNode {
    fn new(token: Option<String>, wait_time: Duration) -> Self {
        Self {
            token,
            instruction: String::new(),
            default: None,
            wait_time,
            loading_message: String::new(),
            commands: Vec::new(),
            children: HashMap::new(),
            events: Vec::new(),
            executed: false,
        }
    }

    pub fn options(&self) -> &[String] {
        &self.commands
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child(&self, token: &str) -> Option<NodeId> {
        self.children.get(token).copied()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// A `RunExec` event on this node has already run
    pub fn executed(&self) -> bool {
        self.executed
    }
}

/// The wizard's states, built once and extended in place by branches
#[derive(Debug, Clone)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    /// Reclaimed slots, reused by `add_child`
    free: Vec<usize>,
    default_wait: Duration,
}

impl FlowGraph {
    pub fn new(default_wait: Duration) -> Self {
        Self {
            nodes: vec![FlowNode::new(None, default_wait)],
            free: Vec::new(),
            default_wait,
        }
    }

    pub fn node(&self, id: NodeId) -> &FlowNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut FlowNode {
        &mut self.nodes[id.0]
    }

    /// Number of live nodes, the root included
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register `tokens` as alternatives leading to one new child of `parent`.
    ///
    /// Only the first token is listed as an option. Re-registering a token
    /// replaces its previous child (last write wins).
    pub fn add_child(&mut self, parent: NodeId, tokens: &[String]) -> Result<NodeId, ConfigError> {
        let Some(primary) = tokens.first() else {
            return Err(ConfigError::NoTokens);
        };
        if let Some(word) = tokens.iter().find(|t| is_reserved(t)) {
            return Err(ConfigError::ReservedWord { word: word.clone() });
        }

        let fresh = FlowNode::new(Some(primary.clone()), self.default_wait);
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = fresh;
                NodeId(slot)
            }
            None => {
                self.nodes.push(fresh);
                NodeId(self.nodes.len() - 1)
            }
        };

        let node = self.node_mut(parent);
        if !node.commands.contains(primary) {
            node.commands.push(primary.clone());
        }
        for token in tokens {
            if let Some(previous) = node.children.insert(token.clone(), id) {
                tracing::debug!(token = %token, ?previous, "Token re-registered, replacing child");
            }
        }
        Ok(id)
    }

    pub fn push_event(&mut self, id: NodeId, event: Event) {
        self.node_mut(id).events.push(event);
    }

    pub fn event(&self, id: NodeId, index: usize) -> Option<&Event> {
        self.node(id).events.get(index)
    }

    pub fn mark_executed(&mut self, id: NodeId) {
        self.node_mut(id).executed = true;
    }

    /// Free every node the cursor can no longer reach from `roots` and
    /// return how many were freed.
    ///
    /// The root slot is never reused; options leading to freed nodes are
    /// dropped so no live node points at a recycled slot.
    pub fn retain_reachable<I>(&mut self, roots: I) -> usize
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut live = vec![false; self.nodes.len()];
        let mut pending: Vec<NodeId> = roots.into_iter().collect();
        while let Some(id) = pending.pop() {
            if std::mem::replace(&mut live[id.0], true) {
                continue;
            }
            pending.extend(self.nodes[id.0].children.values().copied());
        }
        live[NodeId::ROOT.0] = true;

        let mut unused = vec![false; self.nodes.len()];
        for &slot in &self.free {
            unused[slot] = true;
        }

        let mut freed = 0;
        for (slot, node) in self.nodes.iter_mut().enumerate() {
            if live[slot] {
                node.children.retain(|_, child| live[child.0]);
                let children = &node.children;
                node.commands.retain(|token| children.contains_key(token));
            } else if !unused[slot] {
                *node = FlowNode::new(None, self.default_wait);
                self.free.push(slot);
                freed += 1;
            }
        }
        freed
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_WAIT)
    }
}
