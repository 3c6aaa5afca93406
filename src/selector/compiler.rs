//! Selector Compiler
//!
//! Resolves parsed selectors against a configuration namespace map and
//! validates them against the target handler's capability set. Compiled
//! paths are immutable and cached in a process-wide LRU keyed by selector
//! text, namespace map and capability bits, so repeated configuration of the
//! same selector is a lookup.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};

use lru::LruCache;
use tracing::debug;

use super::parser::{self, ParsedPredicate, ParsedSelector};
use super::{Predicate, SelectorPath, Step};
use crate::error::ConfigError;
use crate::namespace::NamespaceMap;
use crate::visitor::Capabilities;

/// Handler the selector is being compiled for
///
/// Carries everything a configuration error must name: the handler, its
/// capability set, and the full descriptive binding text.
pub struct TargetHandler<'a> {
    pub resource: &'a str,
    pub capabilities: Capabilities,
    pub binding: &'a str,
}

const CACHE_CAPACITY: usize = 256;

type CacheKey = (String, String, u8);

fn cache() -> &'static Mutex<LruCache<CacheKey, Arc<SelectorPath>>> {
    static CACHE: OnceLock<Mutex<LruCache<CacheKey, Arc<SelectorPath>>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Mutex::new(LruCache::new(capacity))
    })
}

/// Compile selector text into an immutable, shareable selector path
pub fn compile(
    selector: &str,
    namespaces: &NamespaceMap,
    target: &TargetHandler<'_>,
) -> Result<Arc<SelectorPath>, ConfigError> {
    let key = (
        selector.to_string(),
        namespaces.fingerprint(),
        target.capabilities.bits(),
    );

    if let Ok(mut cached) = cache().lock() {
        if let Some(path) = cached.get(&key) {
            return Ok(Arc::clone(path));
        }
    }

    let parsed = parser::parse(selector).map_err(|reason| ConfigError::Syntax {
        selector: selector.to_string(),
        reason,
    })?;

    let path = resolve(parsed, selector, namespaces)?;
    validate(&path, selector, target)?;

    debug!(selector, steps = path.steps.len(), "compiled selector path");

    let path = Arc::new(path);
    if let Ok(mut cached) = cache().lock() {
        cached.put(key, Arc::clone(&path));
    }

    Ok(path)
}

/// Resolve step and attribute prefixes to namespace URIs
fn resolve(
    parsed: ParsedSelector,
    selector: &str,
    namespaces: &NamespaceMap,
) -> Result<SelectorPath, ConfigError> {
    let mut steps = Vec::with_capacity(parsed.steps.len());

    for parsed_step in parsed.steps {
        let namespace = resolve_prefix(parsed_step.prefix.as_deref(), selector, namespaces)?;

        let mut predicates = Vec::with_capacity(parsed_step.predicates.len());
        for predicate in parsed_step.predicates {
            predicates.push(match predicate {
                ParsedPredicate::AttributeEquals {
                    prefix,
                    name,
                    value,
                } => Predicate::AttributeEquals {
                    namespace: resolve_prefix(prefix.as_deref(), selector, namespaces)?,
                    name,
                    value,
                },
                ParsedPredicate::TextEquals { value } => Predicate::TextEquals { value },
                ParsedPredicate::PositionIndex(index) => Predicate::PositionIndex(index),
            });
        }

        steps.push(Step {
            name: parsed_step.name,
            namespace,
            predicates,
        });
    }

    Ok(SelectorPath {
        absolute: parsed.absolute,
        steps,
    })
}

fn resolve_prefix(
    prefix: Option<&str>,
    selector: &str,
    namespaces: &NamespaceMap,
) -> Result<Option<String>, ConfigError> {
    match prefix {
        None => Ok(None),
        Some(prefix) => match namespaces.resolve(prefix) {
            Some(uri) => Ok(Some(uri.to_string())),
            None => Err(ConfigError::UnknownPrefix {
                prefix: prefix.to_string(),
                selector: selector.to_string(),
            }),
        },
    }
}

/// Predicate/capability compatibility checks
///
/// A text() predicate needs the element's full text, which only exists at
/// element-close. It is therefore restricted to the final step, and to
/// handlers whose capability set is exactly after-visit: a handler that also
/// wants before-visit semantics on the same element cannot be given the text
/// at before time, so the binding is rejected outright rather than silently
/// never matching.
fn validate(
    path: &SelectorPath,
    selector: &str,
    target: &TargetHandler<'_>,
) -> Result<(), ConfigError> {
    let last = path.steps.len() - 1;

    for (i, step) in path.steps.iter().enumerate() {
        if step.text_predicate().is_none() {
            continue;
        }

        if i != last {
            return Err(ConfigError::Syntax {
                selector: selector.to_string(),
                reason: "the text() predicate is only allowed on the final step".to_string(),
            });
        }

        if !target.capabilities.is_after_only() {
            return Err(ConfigError::UnsupportedSelector {
                selector: selector.to_string(),
                binding: target.binding.to_string(),
                visitor: target.resource.to_string(),
            });
        }
    }

    Ok(())
}
