//! Shared test fixtures: a capturing visitor and canned order documents.

use std::sync::{Arc, Mutex};

use crate::events::{Attribute, QName, StreamEvent};
use crate::namespace::NamespaceMap;
use crate::visitor::{
    Capabilities, ElementEnd, ElementStart, HandlerBinding, ResourceConfig, Visitor,
};

/// Install the test subscriber once; RUST_LOG controls verbosity.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Snapshot of one visit callback
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Captured {
    pub local: String,
    pub text: String,
    pub attrs: Vec<(String, String)>,
}

/// Records every callback it receives
pub(crate) struct CaptureVisitor {
    caps: Capabilities,
    pub before: Mutex<Vec<Captured>>,
    pub after: Mutex<Vec<Captured>>,
}

impl CaptureVisitor {
    pub fn before_after() -> Arc<Self> {
        Arc::new(CaptureVisitor {
            caps: Capabilities::BEFORE | Capabilities::AFTER,
            before: Mutex::new(Vec::new()),
            after: Mutex::new(Vec::new()),
        })
    }

    pub fn after_only() -> Arc<Self> {
        Arc::new(CaptureVisitor {
            caps: Capabilities::AFTER,
            before: Mutex::new(Vec::new()),
            after: Mutex::new(Vec::new()),
        })
    }

    pub fn before_captures(&self) -> Vec<Captured> {
        self.before.lock().unwrap().clone()
    }

    pub fn after_captures(&self) -> Vec<Captured> {
        self.after.lock().unwrap().clone()
    }

    pub fn after_locals(&self) -> Vec<String> {
        self.after_captures().into_iter().map(|c| c.local).collect()
    }
}

fn attrs_of(attributes: &[Attribute]) -> Vec<(String, String)> {
    attributes
        .iter()
        .map(|a| (a.name.local.clone(), a.value.clone()))
        .collect()
}

impl Visitor for CaptureVisitor {
    fn name(&self) -> &str {
        "CaptureVisitor"
    }

    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn before(&self, element: &ElementStart<'_>) {
        self.before.lock().unwrap().push(Captured {
            local: element.name.local.clone(),
            text: String::new(),
            attrs: attrs_of(element.attributes),
        });
    }

    fn after(&self, element: &ElementEnd<'_>) {
        self.after.lock().unwrap().push(Captured {
            local: element.name.local.clone(),
            text: element.text.trim().to_string(),
            attrs: attrs_of(element.attributes),
        });
    }
}

pub(crate) fn ns_map() -> Arc<NamespaceMap> {
    Arc::new(NamespaceMap::from_pairs(&[
        ("a", "http://a"),
        ("b", "http://b"),
        ("c", "http://c"),
        ("d", "http://d"),
    ]))
}

pub(crate) fn binding(selector: &str, visitor: Arc<dyn Visitor>) -> HandlerBinding {
    HandlerBinding::new(visitor, ResourceConfig::new(selector, ns_map())).expect("valid binding")
}

/// A small order document:
///
/// ```text
/// <a:ord num="3122" state="finished" xmlns:a="http://a">
///   <a:items>
///     <c:item code="8655" c:code="8655" xmlns:c="http://c">
///       <d:units xmlns:d="http://d">1</d:units>
///     </c:item>
///     <c:item code="8921" c:code="8921">
///       <d:units>2</d:units>
///     </c:item>
///   </a:items>
/// </a:ord>
/// ```
pub(crate) fn order_doc() -> Vec<StreamEvent> {
    let ord = QName::in_ns("ord", "http://a");
    let items = QName::in_ns("items", "http://a");
    let item = QName::in_ns("item", "http://c");
    let units = QName::in_ns("units", "http://d");

    vec![
        StreamEvent::start_with(
            ord.clone(),
            vec![
                Attribute::new(QName::local("num"), "3122"),
                Attribute::new(QName::local("state"), "finished"),
            ],
        ),
        StreamEvent::start(items.clone()),
        StreamEvent::start_with(
            item.clone(),
            vec![
                Attribute::new(QName::local("code"), "8655"),
                Attribute::new(QName::in_ns("code", "http://c"), "8655"),
            ],
        ),
        StreamEvent::start(units.clone()),
        StreamEvent::text("1"),
        StreamEvent::end(units.clone()),
        StreamEvent::end(item.clone()),
        StreamEvent::start_with(
            item.clone(),
            vec![
                Attribute::new(QName::local("code"), "8921"),
                Attribute::new(QName::in_ns("code", "http://c"), "8921"),
            ],
        ),
        StreamEvent::start(units.clone()),
        StreamEvent::text("2"),
        StreamEvent::end(units),
        StreamEvent::end(item),
        StreamEvent::end(items),
        StreamEvent::end(ord),
    ]
}

/// An order with two `items` blocks of two items each; `units` elements carry
/// `id` attributes u11/u12/u21/u22 so tests can tell the positions apart.
pub(crate) fn order_02_doc() -> Vec<StreamEvent> {
    let ord = QName::local("ord");
    let items = QName::local("items");
    let item = QName::in_ns("item", "http://c");
    let units = QName::local("units");

    let mut events = vec![StreamEvent::start(ord.clone())];

    for block in 1..=2 {
        events.push(StreamEvent::start(items.clone()));
        for position in 1..=2 {
            events.push(StreamEvent::start(item.clone()));
            events.push(StreamEvent::start_with(
                units.clone(),
                vec![
                    Attribute::new(QName::local("id"), format!("u{}{}", block, position)),
                    Attribute::new(QName::local("index"), position.to_string()),
                ],
            ));
            events.push(StreamEvent::text(position.to_string()));
            events.push(StreamEvent::end(units.clone()));
            events.push(StreamEvent::end(item.clone()));
        }
        events.push(StreamEvent::end(items.clone()));
    }

    events.push(StreamEvent::end(ord));
    events
}

/// Same-named siblings spread across namespaces: positions must count per
/// qualified name, not per local name.
pub(crate) fn mixed_ns_doc() -> Vec<StreamEvent> {
    let list = QName::local("list");
    let c_entry = QName::in_ns("entry", "http://c");
    let d_entry = QName::in_ns("entry", "http://d");

    vec![
        StreamEvent::start(list.clone()),
        StreamEvent::start(c_entry.clone()),
        StreamEvent::end(c_entry.clone()),
        StreamEvent::start(d_entry.clone()),
        StreamEvent::end(d_entry),
        StreamEvent::start(c_entry.clone()),
        StreamEvent::end(c_entry),
        StreamEvent::end(list),
    ]
}
