//! Error types for tree operations
//!
//! Simple, flat error hierarchy. The selection API absorbs these; they
//! surface only from the arena and service layers.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Cannot place node {node} relative to {target}: {target} lies inside its subtree")]
    HierarchyCycle { node: NodeId, target: NodeId },

    #[error("Node {0} has a parent and cannot be released as a root")]
    NotARoot(NodeId),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}
