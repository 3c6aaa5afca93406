//! Namespace Resolution
//!
//! Prefix-to-URI mapping for one configuration scope. Unlike the per-depth
//! scoping a parser needs, a configuration map is flat and immutable once the
//! owning resource configuration is built; sharing happens through `Arc`.

use std::collections::HashMap;

/// Prefix -> URI table for selector compilation
#[derive(Debug, Default, Clone)]
pub struct NamespaceMap {
    bindings: HashMap<String, String>,
}

impl NamespaceMap {
    /// Create an empty map
    pub fn new() -> Self {
        NamespaceMap {
            bindings: HashMap::new(),
        }
    }

    /// Build a map from (prefix, uri) pairs; a repeated prefix keeps the
    /// last declaration
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut map = NamespaceMap::new();
        for (prefix, uri) in pairs {
            map.declare(*prefix, *uri);
        }
        map
    }

    /// Declare a prefix binding
    pub fn declare(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.bindings.insert(prefix.into(), uri.into());
    }

    /// Resolve a prefix to its namespace URI
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Stable identity string for cache keying
    pub(crate) fn fingerprint(&self) -> String {
        let mut pairs: Vec<(&str, &str)> = self
            .bindings
            .iter()
            .map(|(p, u)| (p.as_str(), u.as_str()))
            .collect();
        pairs.sort_unstable();

        let mut out = String::new();
        for (prefix, uri) in pairs {
            out.push_str(prefix);
            out.push('=');
            out.push_str(uri);
            out.push(';');
        }
        out
    }
}
