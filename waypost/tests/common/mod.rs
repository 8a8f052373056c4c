#![allow(dead_code)]

use std::sync::Arc;
use waypost::{
    Dispatcher, NodeId, NodeRef, Priority,
    testing::{RecordingNode, VisitLog},
};

// ============================================================================
// Tree Builders
// ============================================================================

pub fn dispatcher(name: &str) -> Arc<Dispatcher> {
    Dispatcher::builder().name(name).build()
}

/// Attach a logged recorder and return a handle sharing its visits.
pub fn recorder(
    parent: &Dispatcher,
    node: RecordingNode,
    priority: Priority,
    log: &VisitLog,
) -> (RecordingNode, NodeRef) {
    let node = node.with_log(log);
    let attached = parent.attach_owned(node.clone(), priority);
    (node, attached)
}

// ============================================================================
// Assertions
// ============================================================================

pub fn labels(nodes: &[NodeRef]) -> Vec<String> {
    nodes.iter().map(|node| node.label().to_string()).collect()
}

pub fn is_same(handled: &Option<NodeRef>, expected: NodeId) -> bool {
    handled.as_ref().map(NodeId::of) == Some(expected)
}

pub fn path(value: &str) -> String {
    value.to_string()
}
