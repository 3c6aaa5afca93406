//! Configuration Error Taxonomy
//!
//! All fatal errors surface at configuration time: selector compilation or
//! interceptor chain construction. A selector that simply never fires is
//! normal control flow, never an error. The full message text of
//! `UnsupportedSelector` is part of the observable contract and is asserted
//! verbatim by tests.

use thiserror::Error;

/// Fatal configuration-time error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// text() predicate bound to a visitor that is not after-visit only
    #[error("Unsupported selector '{selector}' on resource '{binding}'. The 'text()' predicate is only supported on visitors with the after-visit capability only. Visitor '{visitor}' declares other visit capabilities.")]
    UnsupportedSelector {
        selector: String,
        binding: String,
        visitor: String,
    },

    /// Malformed selector text
    #[error("Malformed selector '{selector}': {reason}")]
    Syntax { selector: String, reason: String },

    /// Selector prefix absent from the configuration namespace map
    #[error("Unknown namespace prefix '{prefix}' in selector '{selector}'")]
    UnknownPrefix { prefix: String, selector: String },

    /// Interceptor factory failed at chain-build time
    #[error("Failed to construct interceptor '{name}': {reason}")]
    Instantiation { name: String, reason: String },
}
