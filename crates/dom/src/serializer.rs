//! Markup serializer
//!
//! Renders a subtree as indented markup:
//! - childless elements self-close: `<br class="x"/>`
//! - elements with children open, list each child one level deeper (each
//!   followed by a line break), then close
//! - text renders its payload at the current indent
//! - a document prefixes its element markup with the doctype line

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{Element, Node, NodeData, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Serializer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Spaces per tree level
    pub indent_width: usize,
    /// Line emitted before a document's markup
    pub doctype: String,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            doctype: "<!DOCTYPE html>".to_string(),
        }
    }
}

impl SerializerConfig {
    /// Load from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Markup tree serializer
#[derive(Debug, Clone, Default)]
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Serialize a subtree starting at depth zero
    pub fn serialize(&self, arena: &DomArena, id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.serialize_node(arena, id, 0, &mut output)?;
        Ok(output)
    }

    /// Text content: a text node's payload, or each child of an element
    /// serialized at depth zero and followed by a line break
    pub fn text(&self, arena: &DomArena, id: NodeId) -> Result<String> {
        let node = arena.get(id)?;
        if let NodeData::Text(text) = &node.data {
            return Ok(text.clone());
        }

        let mut output = String::new();
        let mut child = node.first_child();
        while let Some(current) = child {
            self.serialize_node(arena, current, 0, &mut output)?;
            output.push('\n');
            child = arena.get(current)?.next_sibling();
        }
        Ok(output)
    }

    /// Serialize a single node; recursion follows depth, siblings are looped
    fn serialize_node(
        &self,
        arena: &DomArena,
        id: NodeId,
        depth: usize,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(id)?;
        let indent = " ".repeat(depth * self.config.indent_width);

        match &node.data {
            NodeData::Text(text) => {
                output.push_str(&indent);
                output.push_str(text);
            }
            NodeData::Element(element) => {
                self.serialize_element(arena, node, element, depth, &indent, output)?;
            }
            NodeData::Document(element) => {
                output.push_str(&self.config.doctype);
                output.push('\n');
                self.serialize_element(arena, node, element, depth, &indent, output)?;
            }
        }

        Ok(())
    }

    fn serialize_element(
        &self,
        arena: &DomArena,
        node: &Node,
        element: &Element,
        depth: usize,
        indent: &str,
        output: &mut String,
    ) -> Result<()> {
        output.push_str(indent);
        output.push('<');
        output.push_str(&element.tag);
        for (key, value) in element.attributes.iter() {
            // Writing into a String cannot fail
            let _ = write!(output, " {}=\"{}\"", key, value);
        }

        let Some(first) = node.first_child() else {
            output.push_str("/>");
            return Ok(());
        };

        output.push_str(">\n");
        let mut child = Some(first);
        while let Some(current) = child {
            self.serialize_node(arena, current, depth + 1, output)?;
            output.push('\n');
            child = arena.get(current)?.next_sibling();
        }
        output.push_str(indent);
        output.push_str("</");
        output.push_str(&element.tag);
        output.push('>');

        Ok(())
    }
}
