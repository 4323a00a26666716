//! Markup DOM Library
//!
//! An in-memory markup tree with jQuery-style selection handles.
//!
//! ## Core Design
//!
//! ```text
//! Dom ─► Selection ─► DomService ─┬─ DomArena  (generational node storage)
//!          (Rc, shared)           └─ RootTable (parentless node → live entries)
//! ```
//!
//! - Nodes are addressed by generation-checked `NodeId`s, never pointers
//! - A tree is freed when the last selection entry reaching it is dropped
//! - Attached nodes live and die with their tree
//! - Single-threaded: selections are `!Send`

pub mod arena;
pub mod document;
pub mod error;
pub mod ownership;
pub mod selection;
pub mod selector;
pub mod serializer;
pub mod service;
pub mod types;

pub use arena::DomArena;
pub use document::Dom;
pub use error::{DomError, Result};
pub use selection::Selection;
pub use selector::Selector;
pub use serializer::{DomSerializer, SerializerConfig};
pub use service::{DomService, Position};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_document_creation() {
        let dom = Dom::new();
        assert_eq!(dom.select("head").size(), 1);
        assert_eq!(dom.select("body").size(), 1);
    }
}
