//! Stream Event Types
//!
//! Defines the events delivered by the external document producer and the
//! push-driven handler contract the matching session implements.

use std::fmt;

/// A namespace-qualified element or attribute name.
///
/// The producer is expected to have resolved namespace declarations already;
/// events carry resolved URIs, never prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub local: String,
    pub namespace: Option<String>,
}

impl QName {
    /// Create a name with no namespace
    pub fn local(local: impl Into<String>) -> Self {
        QName {
            local: local.into(),
            namespace: None,
        }
    }

    /// Create a name bound to a namespace URI
    pub fn in_ns(local: impl Into<String>, uri: impl Into<String>) -> Self {
        QName {
            local: local.into(),
            namespace: Some(uri.into()),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(uri) => write!(f, "{{{}}}{}", uri, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// One attribute on an open-element event
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Attribute {
            name,
            value: value.into(),
        }
    }
}

/// A document stream event
///
/// Open/close events arrive with balanced nesting; anything else is the
/// producer's bug, not the matcher's.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Start of an element, attributes available immediately
    StartElement {
        name: QName,
        attributes: Vec<Attribute>,
    },

    /// Character content of the currently open element
    Text(String),

    /// End of an element
    EndElement { name: QName },
}

impl StreamEvent {
    /// Open an element with no attributes
    pub fn start(name: QName) -> Self {
        StreamEvent::StartElement {
            name,
            attributes: Vec::new(),
        }
    }

    /// Open an element carrying attributes
    pub fn start_with(name: QName, attributes: Vec<Attribute>) -> Self {
        StreamEvent::StartElement { name, attributes }
    }

    /// Character content
    pub fn text(text: impl Into<String>) -> Self {
        StreamEvent::Text(text.into())
    }

    /// Close an element
    pub fn end(name: QName) -> Self {
        StreamEvent::EndElement { name }
    }

    /// Check if this is a start element event
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, StreamEvent::StartElement { .. })
    }

    /// Check if this is an end element event
    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, StreamEvent::EndElement { .. })
    }

    /// Get the element name if this is a start or end element
    pub fn element_name(&self) -> Option<&QName> {
        match self {
            StreamEvent::StartElement { name, .. } => Some(name),
            StreamEvent::EndElement { name } => Some(name),
            _ => None,
        }
    }
}

/// Handler driven by the event producer
///
/// Delivery is synchronous and push-driven; no call suspends or blocks.
pub trait StreamHandler {
    fn start_element(&mut self, name: &QName, attributes: &[Attribute]);
    fn text(&mut self, text: &str);
    fn end_element(&mut self, name: &QName);
}

/// Push a recorded event sequence through a handler
pub fn drive<H: StreamHandler + ?Sized>(events: &[StreamEvent], handler: &mut H) {
    for event in events {
        match event {
            StreamEvent::StartElement { name, attributes } => {
                handler.start_element(name, attributes)
            }
            StreamEvent::Text(text) => handler.text(text),
            StreamEvent::EndElement { name } => handler.end_element(name),
        }
    }
}
