//! Flow graph: wizard states reachable by matching user-typed tokens
//!
//! Nodes live in an arena owned by the session and are addressed by
//! [`NodeId`]; the session's cursor is a plain id, never an owning pointer.

mod builder;
pub mod event;
mod graph;

pub use builder::{BranchRegistry, FlowBuilder};
pub use event::{BranchFn, DisplayFn, Event, ExecFn};
pub use graph::{FlowGraph, FlowNode, NodeId};
