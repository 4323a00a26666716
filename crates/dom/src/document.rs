//! Document facade
//!
//! A `Dom` is a selection pre-seeded with one document root, and the usual
//! entry point for queries:
//!
//! ```
//! use markup_dom::Dom;
//!
//! let dom = Dom::new();
//! dom.select("body")
//!     .append(&dom.select_with("<p/>", [("id", "greeting"), ("text", "Hello")]));
//!
//! assert_eq!(dom.select("#greeting").text(), "Hello\n");
//! ```

use crate::selection::Selection;
use crate::serializer::SerializerConfig;
use crate::service::DomService;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

pub struct Dom {
    selection: Selection,
}

impl Dom {
    /// Create a document with `head` and `body`, using default config
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        let service = Rc::new(RefCell::new(DomService::with_config(config)));
        let root = service.borrow_mut().arena_mut().create_document();
        Self {
            selection: Selection::from_ids(&service, [root]),
        }
    }

    /// An independent handle on the document root
    pub fn selection(&self) -> Selection {
        self.selection.clone()
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Dom {
    type Target = Selection;

    fn deref(&self) -> &Selection {
        &self.selection
    }
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dom").field(&self.selection).finish()
    }
}

impl fmt::Display for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.selection, f)
    }
}
