//! Selection handles
//!
//! A `Selection` is an ordered list of captured nodes sharing one
//! `DomService`. Capturing registers the entry with the root-ownership
//! table; dropping the handle releases every entry, freeing trees nobody
//! references any more.
//!
//! Inserting one selection into another follows a fan-out rule: every target
//! but the last receives a deep copy, the last receives the original nodes.
//! A node therefore never has two parents. The inserted selection keeps
//! pointing at the relocated originals.

use crate::error::Result;
use crate::selector::Selector;
use crate::serializer::DomSerializer;
use crate::service::{DomService, Position};
use crate::types::{Attribute, NodeId};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub struct Selection {
    service: Rc<RefCell<DomService>>,
    nodes: SmallVec<[NodeId; 4]>,
}

impl Selection {
    pub(crate) fn empty(service: Rc<RefCell<DomService>>) -> Self {
        Self {
            service,
            nodes: SmallVec::new(),
        }
    }

    /// Capture every id into a new selection over `service`
    pub(crate) fn from_ids<I>(service: &Rc<RefCell<DomService>>, ids: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut selection = Self::empty(Rc::clone(service));
        {
            let mut service = service.borrow_mut();
            for id in ids {
                match service.capture(id) {
                    Ok(()) => selection.nodes.push(id),
                    Err(error) => tracing::debug!(%id, %error, "Skipping stale node on capture"),
                }
            }
        }
        selection
    }

    /// Number of captured entries
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Identities of the captured nodes, in capture order
    pub fn ids(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Whether both selections share one document store
    pub fn same_document(&self, other: &Selection) -> bool {
        Rc::ptr_eq(&self.service, &other.service)
    }

    /// Selection holding only the `index`-th entry; empty when out of range
    pub fn index(&self, index: usize) -> Selection {
        Self::from_ids(&self.service, self.nodes.get(index).copied())
    }

    /// Direct children of every captured node, concatenated
    pub fn children(&self) -> Selection {
        let ids: Vec<NodeId> = {
            let service = self.service.borrow();
            self.nodes
                .iter()
                .filter_map(|&id| service.arena().children(id).ok())
                .flatten()
                .collect()
        };
        Self::from_ids(&self.service, ids)
    }

    /// Run a selector against the captured nodes.
    ///
    /// An empty query returns a copy of this selection; an unsupported one
    /// returns an empty selection.
    pub fn select(&self, query: &str) -> Selection {
        self.select_with(query, std::iter::empty::<Attribute>())
    }

    /// Like [`select`](Self::select); element literals such as `<p/>` are
    /// created with the given attribute list.
    pub fn select_with<I, A>(&self, query: &str, attributes: I) -> Selection
    where
        I: IntoIterator<Item = A>,
        A: Into<Attribute>,
    {
        if query.is_empty() {
            return self.clone();
        }

        let selector = match Selector::parse(query) {
            Ok(selector) => selector,
            Err(error) => {
                tracing::debug!(%error, "Selector matched nothing");
                return Self::empty(Rc::clone(&self.service));
            }
        };

        if let Selector::Create(tag) = &selector {
            let id = self
                .service
                .borrow_mut()
                .arena_mut()
                .create_element(tag, attributes);
            return Self::from_ids(&self.service, [id]);
        }

        let ids: Vec<NodeId> = {
            let service = self.service.borrow();
            let mut ids = Vec::new();
            for &id in &self.nodes {
                match selector.find_in(service.arena(), id) {
                    Ok(found) => ids.extend(found),
                    Err(error) => tracing::debug!(%id, %error, "Skipping stale node in lookup"),
                }
            }
            ids
        };
        Self::from_ids(&self.service, ids)
    }

    /// Attribute of the first captured node; empty when absent
    pub fn attr(&self, key: &str) -> String {
        let service = self.service.borrow();
        self.nodes
            .first()
            .and_then(|&id| service.arena().get(id).ok())
            .map(|node| node.attr(key).to_string())
            .unwrap_or_default()
    }

    /// Set an attribute on every captured node
    pub fn set_attr(&self, key: &str, value: &str) -> &Self {
        let mut service = self.service.borrow_mut();
        for &id in &self.nodes {
            match service.arena_mut().set_attr(id, key, value) {
                Ok(true) => {}
                Ok(false) => tracing::trace!(%id, key, "Text node ignores attribute"),
                Err(error) => tracing::debug!(%id, %error, "Skipping stale node in set_attr"),
            }
        }
        self
    }

    /// Append `other` as last child of every captured node
    pub fn append(&self, other: &Selection) -> &Self {
        self.insert(other, Position::Append)
    }

    /// Prepend `other` as first child of every captured node
    pub fn prepend(&self, other: &Selection) -> &Self {
        self.insert(other, Position::Prepend)
    }

    /// Insert `other` as sibling before every captured node
    pub fn before(&self, other: &Selection) -> &Self {
        self.insert(other, Position::Before)
    }

    /// Insert `other` as sibling after every captured node
    pub fn after(&self, other: &Selection) -> &Self {
        self.insert(other, Position::After)
    }

    /// Detach every captured node from its tree.
    ///
    /// Each node becomes a standalone root owned by this selection.
    pub fn remove(&self) -> &Self {
        let mut service = self.service.borrow_mut();
        for &id in &self.nodes {
            if let Err(error) = service.detach_owned(id) {
                tracing::debug!(%id, %error, "Skipping stale node in remove");
            }
        }
        self
    }

    /// Markup of the first captured node
    pub fn html(&self) -> String {
        self.render_first(|serializer, service, id| serializer.serialize(service.arena(), id))
    }

    /// Text content of the first captured node
    pub fn text(&self) -> String {
        self.render_first(|serializer, service, id| serializer.text(service.arena(), id))
    }

    /// Markup of every captured node, each followed by a line break
    pub fn serialize(&self) -> String {
        let service = self.service.borrow();
        let serializer = DomSerializer::with_config(service.config().clone());
        let mut output = String::new();
        for &id in &self.nodes {
            match serializer.serialize(service.arena(), id) {
                Ok(markup) => {
                    output.push_str(&markup);
                    output.push('\n');
                }
                Err(error) => tracing::debug!(%id, %error, "Skipping stale node in serialize"),
            }
        }
        output
    }

    /// Distinct roots currently held by the ownership table
    pub fn live_roots(&self) -> usize {
        self.service.borrow().roots().len()
    }

    /// Nodes currently allocated in this document's store
    pub fn live_nodes(&self) -> usize {
        self.service.borrow().arena().len()
    }

    fn render_first<F>(&self, render: F) -> String
    where
        F: FnOnce(&DomSerializer, &DomService, NodeId) -> Result<String>,
    {
        let Some(&id) = self.nodes.first() else {
            return String::new();
        };
        let service = self.service.borrow();
        let serializer = DomSerializer::with_config(service.config().clone());
        render(&serializer, &*service, id).unwrap_or_default()
    }

    fn insert(&self, other: &Selection, position: Position) -> &Self {
        let Some((&last, rest)) = self.nodes.split_last() else {
            return self;
        };

        if !self.same_document(other) {
            self.import(other, position);
            return self;
        }

        let mut service = self.service.borrow_mut();
        for &anchor in rest {
            for &node in &other.nodes {
                if let Err(error) = service.place_copy(anchor, node, position) {
                    tracing::debug!(%anchor, %node, %error, "Skipping copy");
                }
            }
        }
        for &node in &other.nodes {
            if let Err(error) = service.place_original(last, node, position) {
                tracing::debug!(anchor = %last, %node, %error, "Skipping move");
            }
        }
        self
    }

    // Nodes cannot move between stores: every target gets a copy.
    fn import(&self, other: &Selection, position: Position) {
        let source = other.service.borrow();
        let mut service = self.service.borrow_mut();
        for &anchor in &self.nodes {
            for &node in &other.nodes {
                if let Err(error) = service.place_import(source.arena(), anchor, node, position) {
                    tracing::debug!(%anchor, %node, %error, "Skipping import");
                }
            }
        }
    }
}

impl Clone for Selection {
    /// Shallow: re-captures the same nodes, never copies the tree
    fn clone(&self) -> Self {
        Self::from_ids(&self.service, self.nodes.iter().copied())
    }
}

impl Drop for Selection {
    fn drop(&mut self) {
        let Ok(mut service) = self.service.try_borrow_mut() else {
            tracing::error!(
                entries = self.nodes.len(),
                "Store busy while dropping selection; entries not released"
            );
            return;
        };
        for &id in &self.nodes {
            if let Err(error) = service.release(id) {
                tracing::debug!(%id, %error, "Skipping stale node on release");
            }
        }
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
