//! Buffered Evaluation
//!
//! Materializes an event stream into an element tree and evaluates a
//! compiled selector path against it. The walk reproduces the streaming
//! rules exactly (suffix anchoring, namespace-scoped sibling positions,
//! trimmed-text comparison), so both modes reach the same match decisions
//! for the same document.

use std::collections::HashMap;

use crate::events::{Attribute, QName, StreamEvent};
use crate::selector::SelectorPath;

/// One element of a buffered document
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    /// Direct character content, children's text excluded
    pub text: String,
    pub children: Vec<Node>,
}

/// Build an element tree from a recorded event stream
///
/// Returns `None` for a stream with no root element. Text outside any open
/// element and events after the root closes are dropped, matching what a
/// streaming session would do with them.
pub fn build_tree(events: &[StreamEvent]) -> Option<Node> {
    let mut stack: Vec<Node> = Vec::new();

    for event in events {
        match event {
            StreamEvent::StartElement { name, attributes } => {
                stack.push(Node {
                    name: name.clone(),
                    attributes: attributes.clone(),
                    text: String::new(),
                    children: Vec::new(),
                });
            }
            StreamEvent::Text(text) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(text);
                }
            }
            StreamEvent::EndElement { .. } => {
                let closed = match stack.pop() {
                    Some(node) => node,
                    None => continue,
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(closed),
                    None => return Some(closed),
                }
            }
        }
    }

    None
}

/// Evaluate a selector path against a buffered tree
///
/// Matched nodes are returned in document order.
pub fn evaluate<'a>(path: &SelectorPath, root: &'a Node) -> Vec<&'a Node> {
    let mut matches = Vec::new();
    walk(path, root, 0, 1, &[], &mut matches);
    matches
}

fn walk<'a>(
    path: &SelectorPath,
    node: &'a Node,
    depth: usize,
    index: usize,
    inherited: &[usize],
    matches: &mut Vec<&'a Node>,
) {
    let mut candidates: Vec<usize> = inherited.to_vec();
    if !path.absolute || depth == 0 {
        candidates.push(0);
    }
    candidates.sort_unstable();
    candidates.dedup();

    let mut forwarded = Vec::new();

    for candidate in candidates {
        let step = &path.steps[candidate];
        if !step.matches_open(&node.name, &node.attributes, index) {
            continue;
        }

        if candidate + 1 < path.steps.len() {
            forwarded.push(candidate + 1);
            continue;
        }

        match step.text_predicate() {
            Some(expected) if node.text.trim() != expected => {}
            _ => matches.push(node),
        }
    }

    let mut counters: HashMap<&QName, usize> = HashMap::new();
    for child in &node.children {
        let counter = counters.entry(&child.name).or_insert(0);
        *counter += 1;
        walk(path, child, depth + 1, *counter, &forwarded, matches);
    }
}
