//! saxmatch - Streaming selector matching over document event streams
//!
//! Layers:
//! A: Stream events and the push-driven handler contract (events)
//! B: Selector compilation (selector: lexer -> parser -> compiler)
//! C: Visitor bindings and capability validation (visitor)
//! D: Per-document matching sessions (session)
//! E: Interceptor chain composition (interceptor)
//! F: Buffered whole-tree evaluation (buffered)
//! G: Parallel batch filtering (parallel)

pub mod buffered;
pub mod error;
pub mod events;
pub mod interceptor;
pub mod namespace;
pub mod parallel;
pub mod selector;
pub mod session;
pub mod visitor;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::ConfigError;
pub use events::{drive, Attribute, QName, StreamEvent, StreamHandler};
pub use namespace::NamespaceMap;
pub use selector::{compile, NameTest, Predicate, SelectorPath, Step, TargetHandler};
pub use session::{FilterSet, MatchSession, SessionStats};
pub use visitor::{
    Capabilities, ElementEnd, ElementStart, HandlerBinding, ResourceConfig, Visitor,
    DEFAULT_TARGET_PROFILE, SELECTOR_NONE,
};

pub use interceptor::{
    Interceptor, InterceptorChainFactory, InterceptorDefinition, NoopPostConstruct, PostConstruct,
    Scope,
};

pub use buffered::{build_tree, evaluate, Node};
pub use parallel::filter_documents;
