//! Arena-based markup tree storage
//!
//! Nodes live in a generational arena and link to each other by `NodeId`.
//! Every structural edit is a handful of index rewrites:
//!
//! ```text
//! parent.first_child ──► [a] ◄──► [b] ◄──► [c] ◄── parent.last_child
//!                         prev = None        next = None
//! ```
//!
//! Releasing a subtree walks each sibling chain in a loop and only recurses
//! into children, so stack depth follows nesting depth, never chain length.

use crate::error::{DomError, Result};
use crate::types::{Attribute, Element, Node, NodeData, NodeId, TEXT_ATTRIBUTE};
use generational_arena::Arena;
use smallvec::SmallVec;

/// Arena allocator for markup nodes
#[derive(Debug)]
pub struct DomArena {
    nodes: Arena<Node>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
        }
    }

    /// Add a standalone node, returns its ID
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        NodeId(self.nodes.insert(Node::new(data)))
    }

    /// Get node by ID (immutable)
    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(DomError::NodeNotFound(id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    /// Total number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// Iterator over all live nodes
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(index, node)| (NodeId(index), node))
    }

    /// Create an element from a tag and an attribute literal list.
    ///
    /// A `text` entry appends a text child instead of setting an attribute.
    pub fn create_element<I, A>(&mut self, tag: &str, attributes: I) -> NodeId
    where
        I: IntoIterator<Item = A>,
        A: Into<Attribute>,
    {
        let id = self.insert(NodeData::Element(Element::new(tag)));
        for attribute in attributes {
            let Attribute { key, value } = attribute.into();
            if key == TEXT_ATTRIBUTE {
                let text = self.insert(NodeData::Text(value));
                self.link_last(id, text);
            } else if let Some(element) = self
                .nodes
                .get_mut(id.0)
                .and_then(|node| node.data.element_mut())
            {
                element.attributes.set(key, value);
            }
        }
        id
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.insert(NodeData::Text(text.into()))
    }

    /// Create a document root with its fixed `head` and `body` children
    pub fn create_document(&mut self) -> NodeId {
        let id = self.insert(NodeData::Document(Element::new("html")));
        let head = self.insert(NodeData::Element(Element::new("head")));
        let body = self.insert(NodeData::Element(Element::new("body")));
        self.link_last(id, head);
        self.link_last(id, body);
        id
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(id)?.parent)
    }

    pub fn first_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(id)?.first_child)
    }

    pub fn last_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(id)?.last_child)
    }

    pub fn next_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(id)?.next_sibling)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(id)?.prev_sibling)
    }

    pub fn is_first(&self, id: NodeId) -> Result<bool> {
        Ok(self.get(id)?.prev_sibling.is_none())
    }

    pub fn is_last(&self, id: NodeId) -> Result<bool> {
        Ok(self.get(id)?.next_sibling.is_none())
    }

    /// Head of the chain this node belongs to
    pub fn first_sibling(&self, id: NodeId) -> Result<NodeId> {
        if let Some(parent) = self.get(id)?.parent {
            if let Some(first) = self.get(parent)?.first_child {
                return Ok(first);
            }
        }
        let mut current = id;
        while let Some(prev) = self.get(current)?.prev_sibling {
            current = prev;
        }
        Ok(current)
    }

    /// Tail of the chain this node belongs to
    pub fn last_sibling(&self, id: NodeId) -> Result<NodeId> {
        if let Some(parent) = self.get(id)?.parent {
            if let Some(last) = self.get(parent)?.last_child {
                return Ok(last);
            }
        }
        let mut current = id;
        while let Some(next) = self.get(current)?.next_sibling {
            current = next;
        }
        Ok(current)
    }

    /// Topmost ancestor (the node itself when parentless)
    pub fn root_of(&self, id: NodeId) -> Result<NodeId> {
        let mut current = id;
        while let Some(parent) = self.get(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Direct children in order
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut children = Vec::new();
        let mut child = self.get(id)?.first_child;
        while let Some(current) = child {
            children.push(current);
            child = self.get(current)?.next_sibling;
        }
        Ok(children)
    }

    /// Unlink a node from its parent and siblings.
    ///
    /// Former neighbours are stitched together; the node becomes a
    /// standalone root. A no-op on a node that is already standalone.
    pub fn detach(&mut self, id: NodeId) -> Result<NodeId> {
        let (parent, prev, next) = {
            let node = self.get(id)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };

        match prev {
            Some(prev) => self.get_mut(prev)?.next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.get_mut(parent)?.first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.get_mut(next)?.prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.get_mut(parent)?.last_child = prev;
                }
            }
        }

        let node = self.get_mut(id)?;
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
        Ok(id)
    }

    /// Insert `sibling` right after `id`, relocating it from wherever it is.
    ///
    /// The sibling inherits this node's parent.
    pub fn insert_after(&mut self, id: NodeId, sibling: NodeId) -> Result<()> {
        if id == sibling {
            return Ok(());
        }
        self.ensure_outside(sibling, id)?;
        self.detach(sibling)?;
        self.link_after(id, sibling)
    }

    /// Insert `sibling` right before `id`, relocating it from wherever it is.
    pub fn insert_before(&mut self, id: NodeId, sibling: NodeId) -> Result<()> {
        if id == sibling {
            return Ok(());
        }
        self.ensure_outside(sibling, id)?;
        self.detach(sibling)?;
        self.link_before(id, sibling)
    }

    /// Insert `sibling` at the head of the chain `id` belongs to
    pub fn insert_first_sibling(&mut self, id: NodeId, sibling: NodeId) -> Result<()> {
        let first = self.first_sibling(id)?;
        self.insert_before(first, sibling)
    }

    /// Insert `sibling` at the tail of the chain `id` belongs to
    pub fn insert_last_sibling(&mut self, id: NodeId, sibling: NodeId) -> Result<()> {
        let last = self.last_sibling(id)?;
        self.insert_after(last, sibling)
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// Returns `Ok(false)` without touching anything when `parent` is a text
    /// node.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        if !self.accepts_child(parent)? {
            return Ok(false);
        }
        self.ensure_outside(child, parent)?;
        self.detach(child)?;
        self.link_last(parent, child);
        Ok(true)
    }

    /// Attach `child` as the first child of `parent`; text parents ignore it.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        if !self.accepts_child(parent)? {
            return Ok(false);
        }
        self.ensure_outside(child, parent)?;
        self.detach(child)?;
        match self.get(parent)?.first_child {
            Some(first) => self.link_before(first, child)?,
            None => self.link_only_child(parent, child),
        }
        Ok(true)
    }

    pub fn set_attr(&mut self, id: NodeId, key: &str, value: &str) -> Result<bool> {
        Ok(self.get_mut(id)?.set_attr(key, value))
    }

    /// Deep-copy a node and its descendants into a new standalone root
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        let data = self.get(id)?.data.clone();
        let copy = self.insert(data);
        let mut child = self.get(id)?.first_child;
        while let Some(current) = child {
            let child_copy = self.clone_subtree(current)?;
            self.link_last(copy, child_copy);
            child = self.get(current)?.next_sibling;
        }
        Ok(copy)
    }

    /// Deep-copy a subtree living in another arena into this one
    pub fn import_subtree(&mut self, source: &DomArena, id: NodeId) -> Result<NodeId> {
        let node = source.get(id)?;
        let copy = self.insert(node.data.clone());
        let mut child = node.first_child;
        while let Some(current) = child {
            let child_copy = self.import_subtree(source, current)?;
            self.link_last(copy, child_copy);
            child = source.get(current)?.next_sibling;
        }
        Ok(copy)
    }

    /// Detach a node and free it together with its descendants
    pub fn discard(&mut self, id: NodeId) -> Result<usize> {
        self.detach(id)?;
        Ok(self.free_subtree(id))
    }

    /// Free a parentless node and its descendants.
    ///
    /// If the root sits in a chain of parentless siblings, members for which
    /// `is_tracked` is false are freed with it; tracked members are unlinked
    /// and left alone. Returns the number of freed nodes.
    pub fn release_root<F>(&mut self, root: NodeId, is_tracked: F) -> Result<usize>
    where
        F: Fn(NodeId) -> bool,
    {
        if self.get(root)?.parent.is_some() {
            return Err(DomError::NotARoot(root));
        }

        let mut freed = 0;
        let mut current = Some(self.first_sibling(root)?);
        while let Some(member) = current {
            current = self.get(member)?.next_sibling;
            if member == root || !is_tracked(member) {
                self.detach(member)?;
                freed += self.free_subtree(member);
            }
        }
        Ok(freed)
    }

    /// Number of selection entries capturing nodes of this subtree
    pub fn captures_in_subtree(&self, id: NodeId) -> Result<usize> {
        let mut total = 0;
        self.traverse_df(id, |_, node| {
            total += node.captures;
            Ok(())
        })?;
        Ok(total)
    }

    /// Traverse a subtree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(NodeId, &Node) -> Result<()>,
    {
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            let node = self.get(id)?;
            visit(id, node)?;
            self.push_children_reversed(node, &mut stack)?;
        }

        Ok(())
    }

    /// First element in pre-order whose `id` attribute matches
    pub fn find_by_id(&self, start: NodeId, id: &str) -> Result<Option<NodeId>> {
        Ok(self
            .search(start, true, |node| {
                node.data
                    .element()
                    .is_some_and(|element| element.attributes.get("id") == Some(id))
            })?
            .into_iter()
            .next())
    }

    /// All elements with this tag; a match is not searched further
    pub fn find_by_tag(&self, start: NodeId, tag: &str) -> Result<Vec<NodeId>> {
        self.search(start, false, |node| node.tag_name() == Some(tag))
    }

    /// All elements whose whole `class` attribute equals `class`
    pub fn find_by_class(&self, start: NodeId, class: &str) -> Result<Vec<NodeId>> {
        self.search(start, false, |node| {
            node.data
                .element()
                .is_some_and(|element| element.attributes.get("class") == Some(class))
        })
    }

    fn search<F>(&self, start: NodeId, first_only: bool, predicate: F) -> Result<Vec<NodeId>>
    where
        F: Fn(&Node) -> bool,
    {
        let mut found = Vec::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            let node = self.get(id)?;
            if predicate(node) {
                found.push(id);
                if first_only {
                    break;
                }
                continue;
            }
            self.push_children_reversed(node, &mut stack)?;
        }

        Ok(found)
    }

    // Pushed in reverse so they pop left-to-right
    fn push_children_reversed(&self, node: &Node, stack: &mut Vec<NodeId>) -> Result<()> {
        let mut children: SmallVec<[NodeId; 8]> = SmallVec::new();
        let mut child = node.first_child;
        while let Some(current) = child {
            children.push(current);
            child = self.get(current)?.next_sibling;
        }
        stack.extend(children.into_iter().rev());
        Ok(())
    }

    fn accepts_child(&self, parent: NodeId) -> Result<bool> {
        let accepts = self.get(parent)?.data.accepts_children();
        if !accepts {
            tracing::trace!(%parent, "Text node ignores child insertion");
        }
        Ok(accepts)
    }

    /// Fail if `node` is `target` or one of its ancestors
    fn ensure_outside(&self, node: NodeId, target: NodeId) -> Result<()> {
        let mut current = Some(target);
        while let Some(id) = current {
            if id == node {
                return Err(DomError::HierarchyCycle { node, target });
            }
            current = self.get(id)?.parent;
        }
        Ok(())
    }

    // The link_* helpers expect `node` to be a detached singleton.

    fn link_after(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        let (parent, next) = {
            let anchor = self.get(anchor)?;
            (anchor.parent, anchor.next_sibling)
        };
        {
            let linked = self.get_mut(node)?;
            linked.parent = parent;
            linked.prev_sibling = Some(anchor);
            linked.next_sibling = next;
        }
        match next {
            Some(next) => self.get_mut(next)?.prev_sibling = Some(node),
            None => {
                if let Some(parent) = parent {
                    self.get_mut(parent)?.last_child = Some(node);
                }
            }
        }
        self.get_mut(anchor)?.next_sibling = Some(node);
        Ok(())
    }

    fn link_before(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        let (parent, prev) = {
            let anchor = self.get(anchor)?;
            (anchor.parent, anchor.prev_sibling)
        };
        {
            let linked = self.get_mut(node)?;
            linked.parent = parent;
            linked.prev_sibling = prev;
            linked.next_sibling = Some(anchor);
        }
        match prev {
            Some(prev) => self.get_mut(prev)?.next_sibling = Some(node),
            None => {
                if let Some(parent) = parent {
                    self.get_mut(parent)?.first_child = Some(node);
                }
            }
        }
        self.get_mut(anchor)?.prev_sibling = Some(node);
        Ok(())
    }

    fn link_only_child(&mut self, parent: NodeId, node: NodeId) {
        if let Some(linked) = self.nodes.get_mut(node.0) {
            linked.parent = Some(parent);
        }
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.first_child = Some(node);
            parent.last_child = Some(node);
        }
    }

    // Only called with ids that were just looked up or inserted.
    fn link_last(&mut self, parent: NodeId, node: NodeId) {
        let last = self.nodes.get(parent.0).and_then(|p| p.last_child);
        match last {
            Some(last) => {
                if let Err(error) = self.link_after(last, node) {
                    tracing::warn!(%parent, %node, %error, "Failed to link last child");
                }
            }
            None => self.link_only_child(parent, node),
        }
    }

    /// Remove a node and its descendants from storage.
    ///
    /// Iterates over each sibling chain, recursing only into children.
    fn free_subtree(&mut self, id: NodeId) -> usize {
        let Some(node) = self.nodes.remove(id.0) else {
            return 0;
        };
        let mut freed = 1;
        let mut child = node.first_child;
        while let Some(current) = child {
            child = self.nodes.get(current.0).and_then(|c| c.next_sibling);
            freed += self.free_subtree(current);
        }
        freed
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::DomSerializer;

    fn element(arena: &mut DomArena, tag: &str) -> NodeId {
        arena.create_element(tag, std::iter::empty::<Attribute>())
    }

    fn tags(arena: &DomArena, parent: NodeId) -> Vec<String> {
        arena
            .children(parent)
            .unwrap()
            .into_iter()
            .map(|id| arena.get(id).unwrap().tag_name().unwrap_or("#text").to_string())
            .collect()
    }

    #[test]
    fn test_append_and_prepend_order() {
        let mut arena = DomArena::new();
        let parent = element(&mut arena, "ul");
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        let c = element(&mut arena, "c");

        assert!(arena.append_child(parent, b).unwrap());
        assert!(arena.append_child(parent, c).unwrap());
        assert!(arena.prepend_child(parent, a).unwrap());

        assert_eq!(tags(&arena, parent), vec!["a", "b", "c"]);
        assert_eq!(arena.first_child(parent).unwrap(), Some(a));
        assert_eq!(arena.last_child(parent).unwrap(), Some(c));
        assert!(arena.is_first(a).unwrap());
        assert!(arena.is_last(c).unwrap());
        assert_eq!(arena.prev_sibling(a).unwrap(), None);
        assert_eq!(arena.prev_sibling(b).unwrap(), Some(a));
    }

    #[test]
    fn test_insert_after_relocates_node() {
        let mut arena = DomArena::new();
        let parent = element(&mut arena, "div");
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        let c = element(&mut arena, "c");
        for id in [a, b, c] {
            arena.append_child(parent, id).unwrap();
        }

        // Move the head behind the tail: tail cache must follow
        arena.insert_after(c, a).unwrap();
        assert_eq!(tags(&arena, parent), vec!["b", "c", "a"]);
        assert_eq!(arena.first_child(parent).unwrap(), Some(b));
        assert_eq!(arena.last_child(parent).unwrap(), Some(a));
        assert_eq!(arena.parent(a).unwrap(), Some(parent));

        arena.insert_before(b, a).unwrap();
        assert_eq!(tags(&arena, parent), vec!["a", "b", "c"]);
        assert_eq!(arena.last_child(parent).unwrap(), Some(c));
    }

    #[test]
    fn test_insert_first_and_last_sibling() {
        let mut arena = DomArena::new();
        let parent = element(&mut arena, "div");
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        arena.append_child(parent, a).unwrap();

        let head = element(&mut arena, "head");
        let tail = element(&mut arena, "tail");
        arena.insert_first_sibling(a, head).unwrap();
        arena.insert_last_sibling(a, tail).unwrap();
        arena.insert_after(a, b).unwrap();

        assert_eq!(tags(&arena, parent), vec!["head", "a", "b", "tail"]);
        assert_eq!(arena.first_sibling(tail).unwrap(), head);
        assert_eq!(arena.last_sibling(head).unwrap(), tail);
    }

    #[test]
    fn test_parentless_chain_resolves_ends_by_walking() {
        let mut arena = DomArena::new();
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        let c = element(&mut arena, "c");
        arena.insert_after(a, c).unwrap();
        arena.insert_before(c, b).unwrap();

        assert_eq!(arena.first_sibling(c).unwrap(), a);
        assert_eq!(arena.last_sibling(a).unwrap(), c);
        assert_eq!(arena.parent(b).unwrap(), None);
        assert_eq!(arena.root_of(b).unwrap(), b);
    }

    #[test]
    fn test_detach_stitches_neighbours() {
        let mut arena = DomArena::new();
        let parent = element(&mut arena, "div");
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        let c = element(&mut arena, "c");
        for id in [a, b, c] {
            arena.append_child(parent, id).unwrap();
        }

        arena.detach(b).unwrap();
        assert_eq!(tags(&arena, parent), vec!["a", "c"]);
        assert_eq!(arena.prev_sibling(c).unwrap(), Some(a));

        arena.detach(a).unwrap();
        arena.detach(c).unwrap();
        assert_eq!(arena.first_child(parent).unwrap(), None);
        assert_eq!(arena.last_child(parent).unwrap(), None);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let mut arena = DomArena::new();
        let a = element(&mut arena, "a");

        arena.detach(a).unwrap();
        arena.detach(a).unwrap();

        let node = arena.get(a).unwrap();
        assert!(node.is_root());
        assert_eq!(node.next_sibling(), None);
        assert_eq!(node.prev_sibling(), None);
    }

    #[test]
    fn test_text_parent_ignores_children() {
        let mut arena = DomArena::new();
        let text = arena.create_text("hello");
        let a = element(&mut arena, "a");

        assert!(!arena.append_child(text, a).unwrap());
        assert!(!arena.prepend_child(text, a).unwrap());
        assert_eq!(arena.parent(a).unwrap(), None);
        assert_eq!(arena.first_child(text).unwrap(), None);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut arena = DomArena::new();
        let outer = element(&mut arena, "outer");
        let inner = element(&mut arena, "inner");
        arena.append_child(outer, inner).unwrap();

        assert!(matches!(
            arena.append_child(inner, outer),
            Err(DomError::HierarchyCycle { .. })
        ));
        assert!(matches!(
            arena.insert_after(inner, outer),
            Err(DomError::HierarchyCycle { .. })
        ));
        assert_eq!(arena.parent(inner).unwrap(), Some(outer));
    }

    #[test]
    fn test_text_attribute_becomes_child() {
        let mut arena = DomArena::new();
        let p = arena.create_element("p", [("class", "c"), ("text", "Hello")]);

        let node = arena.get(p).unwrap();
        assert_eq!(node.attr("class"), "c");
        assert_eq!(node.attr("text"), "");
        let children = arena.children(p).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(
            arena.get(children[0]).unwrap().data,
            NodeData::Text("Hello".to_string())
        );
    }

    #[test]
    fn test_clone_subtree_is_independent() {
        let mut arena = DomArena::new();
        let div = arena.create_element("div", [("id", "x"), ("text", "hi")]);
        let span = element(&mut arena, "span");
        arena.append_child(div, span).unwrap();

        let copy = arena.clone_subtree(div).unwrap();
        assert_ne!(copy, div);
        assert_eq!(arena.parent(copy).unwrap(), None);
        assert_eq!(arena.children(copy).unwrap().len(), 2);

        arena.set_attr(copy, "id", "y").unwrap();
        assert_eq!(arena.get(div).unwrap().attr("id"), "x");
    }

    #[test]
    fn test_clone_subtree_round_trips_markup() {
        let mut arena = DomArena::new();
        let list = arena.create_element("ul", [("class", "menu")]);
        let first = arena.create_element("li", [("id", "one"), ("text", "First")]);
        let second = arena.create_element("li", [("id", "two"), ("text", "Second")]);
        arena.append_child(list, first).unwrap();
        arena.append_child(list, second).unwrap();

        let serializer = DomSerializer::new();
        let markup = serializer.serialize(&arena, list).unwrap();
        let copy = arena.clone_subtree(list).unwrap();
        assert_eq!(serializer.serialize(&arena, copy).unwrap(), markup);

        // Mutating the source leaves the copy untouched
        arena.set_attr(first, "id", "changed").unwrap();
        let extra = arena.create_text("more");
        arena.append_child(second, extra).unwrap();
        arena.detach(first).unwrap();

        assert_ne!(serializer.serialize(&arena, list).unwrap(), markup);
        assert_eq!(serializer.serialize(&arena, copy).unwrap(), markup);
    }

    #[test]
    fn test_release_root_frees_subtree() {
        let mut arena = DomArena::new();
        let document = arena.create_document();
        assert_eq!(arena.len(), 3);

        let freed = arena.release_root(document, |_| false).unwrap();
        assert_eq!(freed, 3);
        assert!(arena.is_empty());
        assert!(matches!(arena.get(document), Err(DomError::NodeNotFound(_))));
    }

    #[test]
    fn test_release_root_spares_tracked_chain_members() {
        let mut arena = DomArena::new();
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        let c = element(&mut arena, "c");
        arena.insert_after(a, b).unwrap();
        arena.insert_after(b, c).unwrap();

        let freed = arena.release_root(a, |member| member == c).unwrap();
        assert_eq!(freed, 2);
        assert!(arena.contains(c));
        assert!(!arena.contains(b));
        assert!(arena.is_first(c).unwrap());
    }

    #[test]
    fn test_release_attached_node_is_refused() {
        let mut arena = DomArena::new();
        let document = arena.create_document();
        let head = arena.first_child(document).unwrap().unwrap();

        assert!(matches!(
            arena.release_root(head, |_| false),
            Err(DomError::NotARoot(_))
        ));
    }

    #[test]
    fn test_find_by_tag_stops_at_match() {
        let mut arena = DomArena::new();
        let root = element(&mut arena, "div");
        let outer = element(&mut arena, "p");
        let inner = element(&mut arena, "p");
        let other = element(&mut arena, "p");
        arena.append_child(root, outer).unwrap();
        arena.append_child(outer, inner).unwrap();
        arena.append_child(root, other).unwrap();

        assert_eq!(arena.find_by_tag(root, "p").unwrap(), vec![outer, other]);
        assert_eq!(arena.find_by_tag(inner, "p").unwrap(), vec![inner]);
    }

    #[test]
    fn test_find_by_id_and_class() {
        let mut arena = DomArena::new();
        let root = element(&mut arena, "div");
        let a = arena.create_element("span", [("id", "one"), ("class", "x y")]);
        let b = arena.create_element("span", [("id", "two"), ("class", "x")]);
        arena.append_child(root, a).unwrap();
        arena.append_child(root, b).unwrap();

        assert_eq!(arena.find_by_id(root, "two").unwrap(), Some(b));
        assert_eq!(arena.find_by_id(root, "three").unwrap(), None);
        // exact attribute equality, no class-list splitting
        assert_eq!(arena.find_by_class(root, "x").unwrap(), vec![b]);
    }

    #[test]
    fn test_traverse_df_order() {
        let mut arena = DomArena::new();
        let document = arena.create_document();

        let mut visited = Vec::new();
        arena
            .traverse_df(document, |_, node| {
                visited.push(node.tag_name().unwrap_or_default().to_string());
                Ok(())
            })
            .unwrap();

        assert_eq!(visited, vec!["html", "head", "body"]);
    }
}
