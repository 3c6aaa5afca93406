//! Matching Sessions
//!
//! A `FilterSet` is the immutable, shareable collection of handler bindings;
//! a `MatchSession` is the cheap per-document state that replays one event
//! stream against it. Sessions evaluate selectors incrementally against the
//! live ancestor stack and produce exactly the decisions a buffered
//! whole-tree evaluation of the same document would.

mod evaluator;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::events::{Attribute, QName, StreamHandler};
use crate::visitor::{Capabilities, ElementEnd, ElementStart, HandlerBinding};

use evaluator::{DeferredText, Partial, StreamIndexEvaluator};

/// An immutable set of handler bindings, shared across sessions
#[derive(Debug, Clone)]
pub struct FilterSet {
    bindings: Vec<HandlerBinding>,
}

impl FilterSet {
    pub fn new(bindings: Vec<HandlerBinding>) -> Self {
        debug!(bindings = bindings.len(), "filter set assembled");
        FilterSet { bindings }
    }

    pub fn bindings(&self) -> &[HandlerBinding] {
        &self.bindings
    }

    /// Start a new per-document matching session
    pub fn session(&self) -> MatchSession<'_> {
        MatchSession {
            filter: self,
            evaluator: StreamIndexEvaluator::new(),
            stats: SessionStats::default(),
        }
    }
}

/// Counters accumulated over one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub elements: usize,
    pub before_fires: usize,
    pub after_fires: usize,
}

/// Per-document matching state driven by the event producer
///
/// Holds only the ancestor stack and counters; all configuration lives in the
/// borrowed `FilterSet`.
pub struct MatchSession<'a> {
    filter: &'a FilterSet,
    evaluator: StreamIndexEvaluator,
    stats: SessionStats,
}

impl<'a> MatchSession<'a> {
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Selector prefixes that may start matching at this element: partials
    /// inherited from the parent frame, plus a fresh step-0 anchor for every
    /// path allowed to begin here. Relative paths may begin at any depth;
    /// absolute paths only at the root.
    fn candidates(&self, depth: usize) -> Vec<Partial> {
        let mut candidates: Vec<Partial> = self.evaluator.top_partials().to_vec();

        for (index, binding) in self.filter.bindings.iter().enumerate() {
            if let Some(path) = binding.selector_path() {
                if !path.absolute || depth == 0 {
                    candidates.push(Partial {
                        binding: index,
                        path: Arc::clone(path),
                        next_step: 0,
                    });
                }
            }
        }

        // A parent partial and a fresh anchor can coincide; fire once.
        candidates.sort_by_key(|p| (p.binding, p.next_step));
        candidates.dedup_by_key(|p| (p.binding, p.next_step));
        candidates
    }
}

impl StreamHandler for MatchSession<'_> {
    fn start_element(&mut self, name: &QName, attributes: &[Attribute]) {
        let filter = self.filter;
        self.stats.elements += 1;

        let index = self.evaluator.next_sibling_index(name);
        let depth = self.evaluator.depth();
        let candidates = self.candidates(depth);

        self.evaluator.push(name.clone(), attributes.to_vec());

        for candidate in candidates {
            let step = &candidate.path.steps[candidate.next_step];
            if !step.matches_open(name, attributes, index) {
                continue;
            }

            if candidate.next_step + 1 < candidate.path.steps.len() {
                if let Some(frame) = self.evaluator.top_mut() {
                    frame.partials.push(Partial {
                        next_step: candidate.next_step + 1,
                        ..candidate
                    });
                }
                continue;
            }

            // Structurally complete at this element.
            if let Some(expected) = step.text_predicate() {
                if let Some(frame) = self.evaluator.top_mut() {
                    frame.deferred.push(DeferredText {
                        binding: candidate.binding,
                        expected: expected.to_string(),
                    });
                }
                continue;
            }

            let binding = &filter.bindings[candidate.binding];
            if binding.visitor().capabilities().contains(Capabilities::BEFORE) {
                trace!(
                    element = %name,
                    selector = %binding.config().selector,
                    "before visit"
                );
                binding.visitor().before(&ElementStart {
                    name,
                    attributes,
                    index,
                });
                self.stats.before_fires += 1;
            }
            if let Some(frame) = self.evaluator.top_mut() {
                frame.active.push(candidate.binding);
            }
        }
    }

    fn text(&mut self, text: &str) {
        self.evaluator.append_text(text);
    }

    fn end_element(&mut self, name: &QName) {
        let filter = self.filter;

        let frame = match self.evaluator.pop() {
            Some(frame) => frame,
            None => return,
        };

        for deferred in &frame.deferred {
            // Comparison is against whitespace-trimmed direct text.
            if frame.text.trim() != deferred.expected {
                continue;
            }
            let binding = &filter.bindings[deferred.binding];
            if binding.visitor().capabilities().contains(Capabilities::AFTER) {
                trace!(
                    element = %name,
                    selector = %binding.config().selector,
                    "after visit (text predicate)"
                );
                binding.visitor().after(&ElementEnd {
                    name: &frame.name,
                    attributes: &frame.attributes,
                    text: &frame.text,
                });
                self.stats.after_fires += 1;
            }
        }

        for &active in &frame.active {
            let binding = &filter.bindings[active];
            if binding.visitor().capabilities().contains(Capabilities::AFTER) {
                trace!(
                    element = %name,
                    selector = %binding.config().selector,
                    "after visit"
                );
                binding.visitor().after(&ElementEnd {
                    name: &frame.name,
                    attributes: &frame.attributes,
                    text: &frame.text,
                });
                self.stats.after_fires += 1;
            }
        }
    }
}
