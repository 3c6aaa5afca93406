//! Visitor Bindings
//!
//! The visitor contract (before/after callbacks plus a declared capability
//! set), the resource configuration that targets a visitor at a selector, and
//! the immutable binding pairing the two with a compiled selector path.

use std::ops::BitOr;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::events::{Attribute, QName};
use crate::namespace::NamespaceMap;
use crate::selector::compiler::{compile, TargetHandler};
use crate::selector::SelectorPath;

/// Sentinel selector meaning "not matched by structural path"
///
/// A binding carrying this selector wraps the whole document rather than any
/// element, so no selector path is compiled for it and the matching session
/// never fires it.
pub const SELECTOR_NONE: &str = "none";

/// Profile a resource configuration targets when none is given
pub const DEFAULT_TARGET_PROFILE: &str = "default_profile";

/// Visit-phase capability flags
///
/// Compile-time predicate validation is a set check against these: a text()
/// predicate needs the full element text, which a streaming engine only has
/// at close, so it is legal only for visitors that are after-visit ONLY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    /// Fires at element-open, attributes available, text not yet read
    pub const BEFORE: Capabilities = Capabilities(0x01);
    /// Fires at element-close, full element text available
    pub const AFTER: Capabilities = Capabilities(0x02);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when the set is exactly { AFTER }
    #[inline]
    pub const fn is_after_only(self) -> bool {
        self.0 == Self::AFTER.0
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        Capabilities(self.0 | rhs.0)
    }
}

/// Element view passed to the before callback
#[derive(Debug)]
pub struct ElementStart<'a> {
    pub name: &'a QName,
    pub attributes: &'a [Attribute],
    /// 1-based position among same-named, same-namespace siblings
    pub index: usize,
}

/// Element view passed to the after callback
#[derive(Debug)]
pub struct ElementEnd<'a> {
    pub name: &'a QName,
    pub attributes: &'a [Attribute],
    /// Accumulated direct character content of the element
    pub text: &'a str,
}

/// The unit of behavior invoked when a selector matches
///
/// Implementations are shared read-only across concurrent sessions; any
/// per-document state they keep must be interior and thread-safe.
pub trait Visitor: Send + Sync {
    /// Descriptive name used in binding descriptions and error messages
    fn name(&self) -> &str;

    /// Declared visit-phase capability set
    fn capabilities(&self) -> Capabilities;

    /// Called at element-open when the selector fully matches
    fn before(&self, _element: &ElementStart<'_>) {}

    /// Called at element-close for every match recorded at open
    fn after(&self, _element: &ElementEnd<'_>) {}
}

/// Configuration that selected a visitor
///
/// Built once at configuration time; immutable thereafter.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub target_profile: String,
    pub selector: String,
    pub namespaces: Arc<NamespaceMap>,
    pub selector_namespace: Option<String>,
    /// Engine-supplied rather than caller-registered
    pub system: bool,
    pub param_count: usize,
}

impl ResourceConfig {
    /// Caller-registered configuration for the default profile
    pub fn new(selector: impl Into<String>, namespaces: Arc<NamespaceMap>) -> Self {
        ResourceConfig {
            target_profile: DEFAULT_TARGET_PROFILE.to_string(),
            selector: selector.into(),
            namespaces,
            selector_namespace: None,
            system: false,
            param_count: 0,
        }
    }

    /// Engine-supplied configuration
    pub fn system(selector: impl Into<String>, namespaces: Arc<NamespaceMap>) -> Self {
        ResourceConfig {
            system: true,
            ..ResourceConfig::new(selector, namespaces)
        }
    }

    /// Copy of this configuration with the selector text substituted
    ///
    /// Used by the chain builder: an interceptor inherits the base binding's
    /// configuration, overridden by the interceptor's own selector when the
    /// definition carries one.
    pub fn with_selector(&self, selector: impl Into<String>) -> Self {
        ResourceConfig {
            selector: selector.into(),
            ..self.clone()
        }
    }

    /// Full descriptive binding text quoted by configuration errors
    pub fn describe(&self, resource: &str) -> String {
        format!(
            "Target Profile: [{}], Selector: [{}], Selector Namespace URI: [{}], Resource: [{}], Num Params: [{}]",
            self.target_profile,
            self.selector,
            self.selector_namespace.as_deref().unwrap_or("none"),
            resource,
            self.param_count
        )
    }
}

/// A visitor paired with its configuration and compiled selector path
///
/// Created once at configuration time and shared read-only across all
/// sessions using that configuration. A composed interceptor chain is also a
/// `HandlerBinding`, indistinguishable from a plain one at the session
/// boundary.
#[derive(Clone)]
pub struct HandlerBinding {
    visitor: Arc<dyn Visitor>,
    config: ResourceConfig,
    path: Option<Arc<SelectorPath>>,
}

impl HandlerBinding {
    /// Compile the configuration's selector against the visitor's capability
    /// set and pair the two
    pub fn new(visitor: Arc<dyn Visitor>, config: ResourceConfig) -> Result<Self, ConfigError> {
        let path = if config.selector == SELECTOR_NONE {
            None
        } else {
            let description = config.describe(visitor.name());
            let target = TargetHandler {
                resource: visitor.name(),
                capabilities: visitor.capabilities(),
                binding: &description,
            };
            Some(compile(&config.selector, &config.namespaces, &target)?)
        };

        Ok(HandlerBinding {
            visitor,
            config,
            path,
        })
    }

    pub fn visitor(&self) -> &Arc<dyn Visitor> {
        &self.visitor
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Compiled selector path; `None` for the `SELECTOR_NONE` sentinel
    pub fn selector_path(&self) -> Option<&Arc<SelectorPath>> {
        self.path.as_ref()
    }
}

impl std::fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("visitor", &self.visitor.name())
            .field("selector", &self.config.selector)
            .finish()
    }
}
