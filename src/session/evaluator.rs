//! Streaming Selector Evaluator
//!
//! Maintains the live ancestor stack that selector paths are evaluated
//! against. Memory is proportional to document depth plus the direct text of
//! currently-open elements, never to document size.
//!
//! The bottom of the stack is a synthetic document frame: it owns the sibling
//! counter for the root element (making the root position 1, like any other
//! element) and gives step-0 anchoring a parent to hang off.

use std::collections::HashMap;
use std::sync::Arc;

use crate::events::{Attribute, QName};
use crate::selector::SelectorPath;

/// A selector prefix matched up to (but not including) `next_step`
///
/// Carried on the frame whose element matched the previous step; children of
/// that frame try to extend the match by one step.
#[derive(Debug, Clone)]
pub(super) struct Partial {
    pub binding: usize,
    pub path: Arc<SelectorPath>,
    pub next_step: usize,
}

/// A full structural match awaiting its text-equality check at element-close
#[derive(Debug, Clone)]
pub(super) struct DeferredText {
    pub binding: usize,
    pub expected: String,
}

/// One open element (or the synthetic document node at the bottom)
#[derive(Debug)]
pub(super) struct AncestorFrame {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    /// Sibling counters for this frame's children, keyed by qualified name
    counters: HashMap<QName, usize>,
    /// Matches-in-progress whose next step children of this element may extend
    pub partials: Vec<Partial>,
    /// Bindings fully matched at this element's open; fired again at close
    pub active: Vec<usize>,
    /// Structural matches whose text predicate is checked at close
    pub deferred: Vec<DeferredText>,
    /// Direct character content accumulated so far
    pub text: String,
}

impl AncestorFrame {
    fn new(name: QName, attributes: Vec<Attribute>) -> Self {
        AncestorFrame {
            name,
            attributes,
            counters: HashMap::new(),
            partials: Vec::new(),
            active: Vec::new(),
            deferred: Vec::new(),
            text: String::new(),
        }
    }

    fn document() -> Self {
        AncestorFrame::new(QName::local("#document"), Vec::new())
    }
}

/// The per-session ancestor stack
#[derive(Debug)]
pub(super) struct StreamIndexEvaluator {
    stack: Vec<AncestorFrame>,
}

impl StreamIndexEvaluator {
    pub fn new() -> Self {
        StreamIndexEvaluator {
            stack: vec![AncestorFrame::document()],
        }
    }

    /// Number of open elements (the synthetic document frame excluded)
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Allocate the next 1-based sibling position for a child of the current
    /// frame. Counters are keyed by the full qualified name, so same-named
    /// elements in different namespaces count independently.
    pub fn next_sibling_index(&mut self, name: &QName) -> usize {
        // The document frame is never popped, so a last frame always exists.
        match self.stack.last_mut() {
            Some(parent) => {
                let counter = parent.counters.entry(name.clone()).or_insert(0);
                *counter += 1;
                *counter
            }
            None => 1,
        }
    }

    /// Partial matches carried by the current frame
    pub fn top_partials(&self) -> &[Partial] {
        self.stack
            .last()
            .map(|frame| frame.partials.as_slice())
            .unwrap_or(&[])
    }

    pub fn push(&mut self, name: QName, attributes: Vec<Attribute>) {
        self.stack.push(AncestorFrame::new(name, attributes));
    }

    /// Pop the top element frame; the synthetic document frame stays
    pub fn pop(&mut self) -> Option<AncestorFrame> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Append character data to the innermost open element
    pub fn append_text(&mut self, text: &str) {
        if self.stack.len() > 1 {
            if let Some(frame) = self.stack.last_mut() {
                frame.text.push_str(text);
            }
        }
    }

    pub fn top_mut(&mut self) -> Option<&mut AncestorFrame> {
        if self.stack.len() > 1 {
            self.stack.last_mut()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_tracks_pushes_and_pops() {
        let mut eval = StreamIndexEvaluator::new();
        assert_eq!(eval.depth(), 0);

        eval.push(QName::local("ord"), Vec::new());
        eval.push(QName::local("items"), Vec::new());
        assert_eq!(eval.depth(), 2);

        assert!(eval.pop().is_some());
        assert_eq!(eval.depth(), 1);
    }

    #[test]
    fn test_document_frame_is_never_popped() {
        let mut eval = StreamIndexEvaluator::new();
        assert!(eval.pop().is_none());
        assert_eq!(eval.depth(), 0);

        // Root element counts as sibling 1 under the document frame.
        assert_eq!(eval.next_sibling_index(&QName::local("ord")), 1);
    }

    #[test]
    fn test_sibling_counters_are_per_parent() {
        let mut eval = StreamIndexEvaluator::new();
        let item = QName::local("item");

        eval.push(QName::local("items"), Vec::new());
        assert_eq!(eval.next_sibling_index(&item), 1);
        assert_eq!(eval.next_sibling_index(&item), 2);
        assert!(eval.pop().is_some());

        // A fresh parent starts counting from 1 again.
        eval.push(QName::local("items"), Vec::new());
        assert_eq!(eval.next_sibling_index(&item), 1);
    }

    #[test]
    fn test_sibling_counters_are_namespace_scoped() {
        let mut eval = StreamIndexEvaluator::new();
        eval.push(QName::local("items"), Vec::new());

        assert_eq!(eval.next_sibling_index(&QName::in_ns("item", "http://c")), 1);
        assert_eq!(eval.next_sibling_index(&QName::in_ns("item", "http://d")), 1);
        assert_eq!(eval.next_sibling_index(&QName::in_ns("item", "http://c")), 2);
        assert_eq!(eval.next_sibling_index(&QName::local("item")), 1);
    }

    #[test]
    fn test_text_accumulates_on_innermost_frame() {
        let mut eval = StreamIndexEvaluator::new();

        // Text before any element is open is dropped.
        eval.append_text("ignored");

        eval.push(QName::local("units"), Vec::new());
        eval.append_text(" 1");
        eval.append_text("0 ");

        let frame = eval.pop().expect("frame");
        assert_eq!(frame.text, " 10 ");
    }
}
