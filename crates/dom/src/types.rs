//! Core type definitions for the markup tree
//!
//! Key design principles:
//! 1. Generation-checked indices instead of pointers (a freed id never aliases)
//! 2. A closed set of node kinds, matched per operation
//! 3. SmallVec for attribute storage (most elements carry a handful)

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Attribute key that becomes a text child instead of an attribute
pub const TEXT_ATTRIBUTE: &str = "text";

/// Node identifier (generation-checked index into the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}v{}", slot, generation)
    }
}

/// Node type, numbered after the DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Document = 9,
}

/// One entry of an attribute literal list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

impl<K: Into<String>, V: ToString> From<(K, V)> for Attribute {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Element attribute storage
///
/// Keeps first-insertion order; setting an existing key overwrites in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes(SmallVec<[(String, String); 4]>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Tag name plus attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attributes: Attributes,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
        }
    }
}

/// Variant payload of a node
///
/// A document is an element with extra serialization behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Element),
    Text(String),
    Document(Element),
}

impl NodeData {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Document(_) => NodeType::Document,
        }
    }

    /// Element view of this payload (documents included)
    pub fn element(&self) -> Option<&Element> {
        match self {
            NodeData::Element(element) | NodeData::Document(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut Element> {
        match self {
            NodeData::Element(element) | NodeData::Document(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    /// Text nodes never take children
    pub fn accepts_children(&self) -> bool {
        !matches!(self, NodeData::Text(_))
    }
}

/// A node in the markup tree
///
/// Sibling links form a chain per parent. `prev_sibling` is `None` only on
/// the chain head; the parent caches the tail in `last_child` so appends
/// stay O(1). A parentless node is a root.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    /// Live selection entries capturing exactly this node
    pub(crate) captures: usize,
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            next_sibling: None,
            prev_sibling: None,
            first_child: None,
            last_child: None,
            captures: 0,
            data,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Get tag name for element and document nodes
    pub fn tag_name(&self) -> Option<&str> {
        self.data.element().map(|element| element.tag.as_str())
    }

    /// Get attribute value, empty when absent or on text nodes
    pub fn attr(&self, key: &str) -> &str {
        self.data
            .element()
            .and_then(|element| element.attributes.get(key))
            .unwrap_or("")
    }

    /// Set attribute value; returns false on text nodes
    pub fn set_attr(&mut self, key: &str, value: &str) -> bool {
        match self.data.element_mut() {
            Some(element) => {
                element.attributes.set(key, value);
                true
            }
            None => false,
        }
    }
}
