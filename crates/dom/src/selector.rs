//! Selector mini-language
//!
//! - `<tag/>`, `<tag>`, `<tag></tag>`: create a standalone element
//! - `#id`: first element with that id, per searched subtree
//! - `tag`: every element with that tag name
//! - `.class`: every element whose class attribute equals the name exactly
//!
//! Anything else is rejected and yields an empty selection upstream.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::NodeId;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Create(String),
    Id(String),
    Tag(String),
    Class(String),
}

impl Selector {
    pub fn parse(query: &str) -> Result<Self> {
        static LITERAL: OnceLock<Regex> = OnceLock::new();
        static QUICK: OnceLock<Regex> = OnceLock::new();

        let literal = LITERAL.get_or_init(|| {
            Regex::new(r"^<([\w-]+)\s*/?>(?:</([\w-]+)>)?$").expect("Invalid literal regex")
        });
        if let Some(captures) = literal.captures(query) {
            let tag = &captures[1];
            return match captures.get(2) {
                Some(close) if close.as_str() != tag => {
                    Err(DomError::InvalidSelector(query.to_string()))
                }
                _ => Ok(Selector::Create(tag.to_string())),
            };
        }

        let quick = QUICK.get_or_init(|| {
            Regex::new(r"^(?:#([\w-]+)|(\w+)|\.([\w-]+))$").expect("Invalid quick regex")
        });
        let captures = quick
            .captures(query)
            .ok_or_else(|| DomError::InvalidSelector(query.to_string()))?;

        if let Some(id) = captures.get(1) {
            Ok(Selector::Id(id.as_str().to_string()))
        } else if let Some(tag) = captures.get(2) {
            Ok(Selector::Tag(tag.as_str().to_string()))
        } else if let Some(class) = captures.get(3) {
            Ok(Selector::Class(class.as_str().to_string()))
        } else {
            Err(DomError::InvalidSelector(query.to_string()))
        }
    }

    /// Matches within the subtree rooted at `start` (inclusive)
    pub fn find_in(&self, arena: &DomArena, start: NodeId) -> Result<Vec<NodeId>> {
        match self {
            Selector::Create(_) => Ok(Vec::new()),
            Selector::Id(id) => Ok(arena.find_by_id(start, id)?.into_iter().collect()),
            Selector::Tag(tag) => arena.find_by_tag(start, tag),
            Selector::Class(class) => arena.find_by_class(start, class),
        }
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(query: &str) -> Result<Self> {
        Self::parse(query)
    }
}
