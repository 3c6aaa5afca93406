//! Interceptor Chains
//!
//! Composes interceptors around a base handler binding by folding
//! definitions into nested bindings. The composed chain is itself a
//! `HandlerBinding`, indistinguishable from a plain one at the session
//! boundary.
//!
//! Ordering: custom interceptors are applied first and system interceptors
//! last, so the innermost wrapper around the base is custom and the
//! outermost is system. The outermost interceptor therefore observes the
//! before visit first and the after visit last.

use std::sync::Arc;

use tracing::debug;

use crate::error::ConfigError;
use crate::visitor::{HandlerBinding, ResourceConfig, Visitor, SELECTOR_NONE};

/// A visitor that wraps another handler binding
///
/// Implementations hold the wrapped binding and delegate to it from their
/// own callbacks. An interceptor that wants the chain to stay transparent
/// reports the wrapped binding's capability set as its own; selector
/// validation then sees the base visitor's capabilities through any number
/// of wrappers.
pub trait Interceptor: Visitor {
    /// Receive the binding this interceptor wraps
    fn set_binding(&mut self, inner: HandlerBinding);
}

/// Construction-time context handed to the post-construct hook
pub struct Scope<'a> {
    pub config: &'a ResourceConfig,
}

/// Hook invoked once per interceptor, right after construction and wiring
pub trait PostConstruct: Send + Sync {
    fn apply(&self, visitor: &dyn Visitor, scope: &Scope<'_>);
}

/// The default hook: does nothing
pub struct NoopPostConstruct;

impl PostConstruct for NoopPostConstruct {
    fn apply(&self, _visitor: &dyn Visitor, _scope: &Scope<'_>) {}
}

type InterceptorFactory = Box<dyn Fn() -> Result<Box<dyn Interceptor>, String> + Send + Sync>;

/// One registered interceptor: a name, its configuration, and the factory
/// that produces a fresh instance per chain build
pub struct InterceptorDefinition {
    name: String,
    config: ResourceConfig,
    factory: InterceptorFactory,
}

impl InterceptorDefinition {
    pub fn new(
        name: impl Into<String>,
        config: ResourceConfig,
        factory: InterceptorFactory,
    ) -> Self {
        InterceptorDefinition {
            name: name.into(),
            config,
            factory,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    fn instantiate(&self) -> Result<Box<dyn Interceptor>, ConfigError> {
        (self.factory)().map_err(|reason| ConfigError::Instantiation {
            name: self.name.clone(),
            reason,
        })
    }
}

impl std::fmt::Debug for InterceptorDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorDefinition")
            .field("name", &self.name)
            .field("selector", &self.config.selector)
            .field("system", &self.config.system)
            .finish()
    }
}

/// Builds interceptor chains around base bindings
pub struct InterceptorChainFactory {
    definitions: Vec<InterceptorDefinition>,
    post_construct: Arc<dyn PostConstruct>,
}

impl InterceptorChainFactory {
    pub fn new(post_construct: Arc<dyn PostConstruct>) -> Self {
        InterceptorChainFactory {
            definitions: Vec::new(),
            post_construct,
        }
    }

    pub fn add_definition(&mut self, definition: InterceptorDefinition) {
        self.definitions.push(definition);
    }

    pub fn definitions(&self) -> &[InterceptorDefinition] {
        &self.definitions
    }

    /// Wrap `base` in the registered interceptors
    ///
    /// With no definitions the base binding is returned untouched. Any
    /// instantiation failure aborts the whole chain; a partially wrapped
    /// binding is never returned.
    ///
    /// Each interceptor's binding reuses the base configuration, with the
    /// selector overridden when the definition carries one of its own. The
    /// base namespace map always applies.
    pub fn build_chain(&self, base: HandlerBinding) -> Result<HandlerBinding, ConfigError> {
        if self.definitions.is_empty() {
            return Ok(base);
        }

        let base_config = base.config().clone();
        let mut current = base;

        for definition in self.custom_first_system_last() {
            let mut instance = definition.instantiate()?;
            instance.set_binding(current);

            let config = if definition.config.selector == SELECTOR_NONE {
                base_config.clone()
            } else {
                base_config.with_selector(definition.config.selector.clone())
            };

            let interceptor: Arc<dyn Interceptor> = Arc::from(instance);
            self.post_construct
                .apply(&*interceptor, &Scope { config: &config });

            let visitor: Arc<dyn Visitor> = interceptor;
            current = HandlerBinding::new(visitor, config)?;
        }

        debug!(
            interceptors = self.definitions.len(),
            selector = %base_config.selector,
            "interceptor chain assembled"
        );

        Ok(current)
    }

    /// Application order: custom definitions in registration order, then
    /// system definitions in registration order
    fn custom_first_system_last(&self) -> Vec<&InterceptorDefinition> {
        let (custom, system): (Vec<_>, Vec<_>) = self
            .definitions
            .iter()
            .partition(|definition| !definition.config.system);

        custom.into_iter().chain(system).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::events::drive;
    use crate::session::FilterSet;
    use crate::testutil::{ns_map, order_doc, CaptureVisitor};
    use crate::visitor::{Capabilities, ElementEnd, ElementStart};

    /// Logs its label around delegation; capability-transparent.
    struct LoggingInterceptor {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        inner: Option<HandlerBinding>,
    }

    impl LoggingInterceptor {
        fn factory(label: &'static str, log: Arc<Mutex<Vec<String>>>) -> InterceptorFactory {
            Box::new(move || {
                Ok(Box::new(LoggingInterceptor {
                    label,
                    log: Arc::clone(&log),
                    inner: None,
                }))
            })
        }
    }

    impl Visitor for LoggingInterceptor {
        fn name(&self) -> &str {
            self.label
        }

        fn capabilities(&self) -> Capabilities {
            self.inner
                .as_ref()
                .map(|inner| inner.visitor().capabilities())
                .unwrap_or(Capabilities::NONE)
        }

        fn before(&self, element: &ElementStart<'_>) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:before", self.label));
            if let Some(inner) = &self.inner {
                inner.visitor().before(element);
            }
        }

        fn after(&self, element: &ElementEnd<'_>) {
            if let Some(inner) = &self.inner {
                inner.visitor().after(element);
            }
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:after", self.label));
        }
    }

    impl Interceptor for LoggingInterceptor {
        fn set_binding(&mut self, inner: HandlerBinding) {
            self.inner = Some(inner);
        }
    }

    /// Base visitor that logs to the same shared log as the interceptors.
    struct LoggingBase {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Visitor for LoggingBase {
        fn name(&self) -> &str {
            "LoggingBase"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::BEFORE | Capabilities::AFTER
        }

        fn before(&self, _element: &ElementStart<'_>) {
            self.log.lock().unwrap().push("base:before".to_string());
        }

        fn after(&self, _element: &ElementEnd<'_>) {
            self.log.lock().unwrap().push("base:after".to_string());
        }
    }

    /// Records the visitor name and scope selector of every apply call.
    struct RecordingHook {
        applied: Mutex<Vec<(String, String)>>,
    }

    impl PostConstruct for RecordingHook {
        fn apply(&self, visitor: &dyn Visitor, scope: &Scope<'_>) {
            self.applied
                .lock()
                .unwrap()
                .push((visitor.name().to_string(), scope.config.selector.clone()));
        }
    }

    fn base_binding(log: &Arc<Mutex<Vec<String>>>) -> HandlerBinding {
        HandlerBinding::new(
            Arc::new(LoggingBase {
                log: Arc::clone(log),
            }),
            ResourceConfig::new("item[@code = '8655']", ns_map()),
        )
        .expect("base binding")
    }

    #[test]
    fn test_empty_factory_returns_base_unchanged() {
        let factory = InterceptorChainFactory::new(Arc::new(NoopPostConstruct));
        let visitor = CaptureVisitor::before_after();
        let base = HandlerBinding::new(visitor.clone(), ResourceConfig::new("item", ns_map()))
            .expect("base binding");

        let chain = factory.build_chain(base).expect("chain");

        let expected: Arc<dyn Visitor> = visitor;
        assert!(Arc::ptr_eq(chain.visitor(), &expected));
    }

    #[test]
    fn test_system_interceptor_wraps_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut factory = InterceptorChainFactory::new(Arc::new(NoopPostConstruct));

        // Registered system-first to prove registration order is not
        // application order.
        factory.add_definition(InterceptorDefinition::new(
            "S",
            ResourceConfig::system(SELECTOR_NONE, ns_map()),
            LoggingInterceptor::factory("S", Arc::clone(&log)),
        ));
        factory.add_definition(InterceptorDefinition::new(
            "C",
            ResourceConfig::new(SELECTOR_NONE, ns_map()),
            LoggingInterceptor::factory("C", Arc::clone(&log)),
        ));

        let chain = factory.build_chain(base_binding(&log)).expect("chain");
        let filter = FilterSet::new(vec![chain]);
        let mut session = filter.session();
        drive(&order_doc(), &mut session);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "S:before",
                "C:before",
                "base:before",
                "base:after",
                "C:after",
                "S:after"
            ]
        );
    }

    #[test]
    fn test_hook_runs_once_per_interceptor_in_construction_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hook = Arc::new(RecordingHook {
            applied: Mutex::new(Vec::new()),
        });
        let mut factory = InterceptorChainFactory::new(hook.clone());

        factory.add_definition(InterceptorDefinition::new(
            "S",
            ResourceConfig::system(SELECTOR_NONE, ns_map()),
            LoggingInterceptor::factory("S", Arc::clone(&log)),
        ));
        factory.add_definition(InterceptorDefinition::new(
            "C",
            ResourceConfig::new(SELECTOR_NONE, ns_map()),
            LoggingInterceptor::factory("C", Arc::clone(&log)),
        ));

        factory.build_chain(base_binding(&log)).expect("chain");

        let applied = hook.applied.lock().unwrap();
        let names: Vec<_> = applied.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["C", "S"]);
    }

    #[test]
    fn test_definition_selector_overrides_scope() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hook = Arc::new(RecordingHook {
            applied: Mutex::new(Vec::new()),
        });
        let mut factory = InterceptorChainFactory::new(hook.clone());

        factory.add_definition(InterceptorDefinition::new(
            "C",
            ResourceConfig::new("items", ns_map()),
            LoggingInterceptor::factory("C", Arc::clone(&log)),
        ));
        factory.add_definition(InterceptorDefinition::new(
            "S",
            ResourceConfig::system(SELECTOR_NONE, ns_map()),
            LoggingInterceptor::factory("S", Arc::clone(&log)),
        ));

        factory.build_chain(base_binding(&log)).expect("chain");

        let applied = hook.applied.lock().unwrap();
        assert_eq!(applied[0], ("C".to_string(), "items".to_string()));
        // No selector of its own: inherits the base binding's.
        assert_eq!(
            applied[1],
            ("S".to_string(), "item[@code = '8655']".to_string())
        );
    }

    #[test]
    fn test_instantiation_failure_aborts_the_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut factory = InterceptorChainFactory::new(Arc::new(NoopPostConstruct));

        factory.add_definition(InterceptorDefinition::new(
            "C",
            ResourceConfig::new(SELECTOR_NONE, ns_map()),
            LoggingInterceptor::factory("C", Arc::clone(&log)),
        ));
        factory.add_definition(InterceptorDefinition::new(
            "Broken",
            ResourceConfig::system(SELECTOR_NONE, ns_map()),
            Box::new(|| Err("missing collaborator".to_string())),
        ));

        let err = factory.build_chain(base_binding(&log)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to construct interceptor 'Broken': missing collaborator"
        );
    }

    #[test]
    fn test_chain_is_capability_transparent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut factory = InterceptorChainFactory::new(Arc::new(NoopPostConstruct));
        factory.add_definition(InterceptorDefinition::new(
            "C",
            ResourceConfig::new(SELECTOR_NONE, ns_map()),
            LoggingInterceptor::factory("C", Arc::clone(&log)),
        ));

        let chain = factory.build_chain(base_binding(&log)).expect("chain");

        assert_eq!(
            chain.visitor().capabilities(),
            Capabilities::BEFORE | Capabilities::AFTER
        );
    }
}
