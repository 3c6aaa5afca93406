//! Selector Engine
//!
//! Compiles the restricted structural-query language into a resolved
//! `SelectorPath` evaluated step-by-step against live open/close events:
//! - `lexer`: tokenizes selector text
//! - `parser`: tokens -> unresolved steps and predicates
//! - `compiler`: prefix resolution, capability validation, LRU-cached
//!   compilation

pub mod compiler;
pub mod lexer;
pub mod parser;

pub use compiler::{compile, TargetHandler};

use crate::events::{Attribute, QName};

/// Element name test for one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    /// Wildcard `*`
    Any,
    /// Exact local name
    Name(String),
}

/// Boolean condition attached to a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[@name = 'value']` — checked at element-open (attributes are always
    /// available then)
    AttributeEquals {
        name: String,
        namespace: Option<String>,
        value: String,
    },
    /// `[text() = 'value']` — deferred to element-close; legal only on the
    /// final step, only for after-visit-only handlers
    TextEquals { value: String },
    /// `[n]` — 1-based index among same-named, same-namespace siblings under
    /// the same parent
    PositionIndex(usize),
}

/// One segment of a selector, matching one level of element nesting
///
/// `namespace` holds the URI the step's prefix resolved to at compile time.
/// A step with no namespace matches an element in any namespace; a step with
/// one matches only elements in exactly that namespace (a mismatch is a hard
/// miss, never a fallback to the unqualified interpretation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: NameTest,
    pub namespace: Option<String>,
    pub predicates: Vec<Predicate>,
}

impl Step {
    /// Evaluate everything knowable at element-open: name, namespace,
    /// attribute equality, and sibling position. Text predicates are skipped
    /// here; the caller defers them to element-close.
    pub fn matches_open(&self, name: &QName, attributes: &[Attribute], index: usize) -> bool {
        match &self.name {
            NameTest::Any => {}
            NameTest::Name(local) => {
                if *local != name.local {
                    return false;
                }
            }
        }

        if let Some(uri) = &self.namespace {
            if name.namespace.as_deref() != Some(uri.as_str()) {
                return false;
            }
        }

        for predicate in &self.predicates {
            match predicate {
                Predicate::AttributeEquals {
                    name: attr,
                    namespace,
                    value,
                } => {
                    let found = attributes.iter().any(|a| {
                        a.name.local == *attr
                            && match namespace {
                                Some(uri) => a.name.namespace.as_deref() == Some(uri.as_str()),
                                None => true,
                            }
                            && a.value == *value
                    });
                    if !found {
                        return false;
                    }
                }
                Predicate::TextEquals { .. } => {}
                Predicate::PositionIndex(n) => {
                    if index != *n {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// The expected value of this step's text predicate, if it has one
    pub fn text_predicate(&self) -> Option<&str> {
        self.predicates.iter().find_map(|p| match p {
            Predicate::TextEquals { value } => Some(value.as_str()),
            _ => None,
        })
    }
}

/// Compiled selector: ordered steps, evaluated root-to-leaf against the live
/// ancestor stack
///
/// A relative path may begin matching at any element; a path written with a
/// leading `/` is anchored to the document root. Immutable once compiled and
/// safe to share across concurrent sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

impl SelectorPath {
    /// Whether the final step defers a text-equality check to element-close
    pub fn leaf_has_text_predicate(&self) -> bool {
        self.steps
            .last()
            .map(|s| s.text_predicate().is_some())
            .unwrap_or(false)
    }
}
