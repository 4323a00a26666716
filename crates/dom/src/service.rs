//! DOM Service - shared store behind every selection of one document
//!
//! This handles:
//! - Node storage (the arena)
//! - The root-ownership table and its capture/release protocol
//! - Moving, copying and detaching subtrees while keeping the table exact
//!
//! Accounting rule: the count of a root equals the number of live selection
//! entries that capture a node inside that root's tree. When a subtree
//! changes root, its whole capture weight moves with it.

use crate::arena::DomArena;
use crate::error::Result;
use crate::ownership::RootTable;
use crate::serializer::SerializerConfig;
use crate::types::NodeId;

/// Where a placed node lands relative to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Last child of the target
    Append,
    /// First child of the target
    Prepend,
    /// Sibling immediately before the target
    Before,
    /// Sibling immediately after the target
    After,
}

/// Main DOM service
#[derive(Debug, Default)]
pub struct DomService {
    config: SerializerConfig,
    arena: DomArena,
    roots: RootTable,
}

impl DomService {
    /// Create new service with default config
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self {
            config,
            arena: DomArena::new(),
            roots: RootTable::new(),
        }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Get mutable reference to internal arena
    pub fn arena_mut(&mut self) -> &mut DomArena {
        &mut self.arena
    }

    pub fn roots(&self) -> &RootTable {
        &self.roots
    }

    /// Register one selection entry for `id`
    pub fn capture(&mut self, id: NodeId) -> Result<()> {
        self.arena.get_mut(id)?.captures += 1;
        let root = self.arena.root_of(id)?;
        self.roots.increment(root, 1);
        Ok(())
    }

    /// Drop one selection entry for `id`, freeing its tree if it was the
    /// last reference. The root is resolved now, not at capture time.
    pub fn release(&mut self, id: NodeId) -> Result<()> {
        let node = self.arena.get_mut(id)?;
        if node.captures == 0 {
            tracing::warn!(%id, "Releasing a node with no recorded captures");
        }
        node.captures = node.captures.saturating_sub(1);
        let root = self.arena.root_of(id)?;
        self.settle(root, 1)
    }

    /// Deep-copy `node` and place the copy at `target`
    pub fn place_copy(&mut self, target: NodeId, node: NodeId, position: Position) -> Result<()> {
        let copy = self.arena.clone_subtree(node)?;
        self.place_fresh(target, copy, position)
    }

    /// Copy a node owned by another service and place it at `target`
    pub fn place_import(
        &mut self,
        source: &DomArena,
        target: NodeId,
        node: NodeId,
        position: Position,
    ) -> Result<()> {
        let copy = self.arena.import_subtree(source, node)?;
        self.place_fresh(target, copy, position)
    }

    /// Relocate `node` itself to `target`, moving its capture weight from
    /// the old root to the new one.
    ///
    /// The weight is counted by walking the moved subtree, so a move costs
    /// O(size of the subtree) rather than O(1).
    pub fn place_original(
        &mut self,
        target: NodeId,
        node: NodeId,
        position: Position,
    ) -> Result<()> {
        let neighbour = self.chain_neighbour(node)?;
        let old_root = self.arena.root_of(node)?;
        let weight = self.arena.captures_in_subtree(node)?;
        let attached = self.attach(target, node, position);
        self.transfer(old_root, node, weight)?;
        if let Some(neighbour) = neighbour {
            self.sweep_chain(neighbour)?;
        }
        attached.map(|_| ())
    }

    /// Detach `node` into a standalone root that owns its own captures.
    ///
    /// Walks the subtree to count its captures, like `place_original`.
    pub fn detach_owned(&mut self, node: NodeId) -> Result<()> {
        let neighbour = self.chain_neighbour(node)?;
        let old_root = self.arena.root_of(node)?;
        let weight = self.arena.captures_in_subtree(node)?;
        self.arena.detach(node)?;
        self.transfer(old_root, node, weight)?;
        match neighbour {
            Some(neighbour) => self.sweep_chain(neighbour),
            None => Ok(()),
        }
    }

    fn attach(&mut self, target: NodeId, node: NodeId, position: Position) -> Result<bool> {
        match position {
            Position::Append => self.arena.append_child(target, node),
            Position::Prepend => self.arena.prepend_child(target, node),
            Position::Before => self.arena.insert_before(target, node).map(|()| true),
            Position::After => self.arena.insert_after(target, node).map(|()| true),
        }
    }

    // A copy that found no home is untracked; free it now.
    fn place_fresh(&mut self, target: NodeId, copy: NodeId, position: Position) -> Result<()> {
        match self.attach(target, copy, position) {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.arena.discard(copy)?;
                Ok(())
            }
            Err(error) => {
                self.arena.discard(copy)?;
                Err(error)
            }
        }
    }

    // Any sibling of a parentless node; the chain it shares may lose its
    // only tracked member when the node leaves.
    fn chain_neighbour(&self, node: NodeId) -> Result<Option<NodeId>> {
        let node = self.arena.get(node)?;
        if node.parent().is_some() {
            return Ok(None);
        }
        Ok(node.prev_sibling().or(node.next_sibling()))
    }

    /// Free a chain of parentless siblings that no table entry reaches.
    ///
    /// Untracked chain members (fan-out copies) are only kept alive by a
    /// tracked member of the same chain.
    fn sweep_chain(&mut self, member: NodeId) -> Result<()> {
        if !self.arena.contains(member) || self.arena.parent(member)?.is_some() {
            return Ok(());
        }
        let mut current = Some(self.arena.first_sibling(member)?);
        while let Some(id) = current {
            if self.roots.contains(id) {
                return Ok(());
            }
            current = self.arena.next_sibling(id)?;
        }
        let freed = self.arena.release_root(member, |_| false)?;
        tracing::debug!(%member, freed, "Released orphaned sibling chain");
        Ok(())
    }

    fn transfer(&mut self, old_root: NodeId, node: NodeId, weight: usize) -> Result<()> {
        let new_root = self.arena.root_of(node)?;
        if new_root == old_root {
            return Ok(());
        }
        self.roots.increment(new_root, weight);
        self.settle(old_root, weight)
    }

    /// Lower the count of `root` by `weight`; free the tree at zero.
    ///
    /// A root that has since gained a parent is owned by that tree: its stale
    /// entry is erased and nothing is freed.
    fn settle(&mut self, root: NodeId, weight: usize) -> Result<()> {
        if self.arena.parent(root)?.is_some() {
            self.roots.forget(root);
            return Ok(());
        }

        if self.roots.decrement(root, weight) == Some(0) {
            let roots = &self.roots;
            let freed = self
                .arena
                .release_root(root, |member| roots.contains(member))?;
            tracing::debug!(%root, freed, "Released root");
        }
        Ok(())
    }

    /// Check the accounting rule against the whole arena
    #[cfg(test)]
    pub(crate) fn audit(&self) -> std::result::Result<(), String> {
        let mut expected: ahash::AHashMap<NodeId, usize> = ahash::AHashMap::new();
        for (id, node) in self.arena.iter() {
            if node.captures > 0 {
                let root = self.arena.root_of(id).map_err(|e| e.to_string())?;
                *expected.entry(root).or_insert(0) += node.captures;
            }
        }
        for (root, count) in self.roots.iter() {
            if !self.arena.contains(root) {
                return Err(format!("table key {} was freed", root));
            }
            if self.arena.parent(root).map_err(|e| e.to_string())?.is_some() {
                return Err(format!("attached node {} is a table key", root));
            }
            if expected.get(&root).copied().unwrap_or(0) != count {
                return Err(format!(
                    "root {} counted {} but {} entries reach it",
                    root,
                    count,
                    expected.get(&root).copied().unwrap_or(0)
                ));
            }
        }
        if expected.len() != self.roots.len() {
            return Err(format!(
                "{} roots captured but {} table entries",
                expected.len(),
                self.roots.len()
            ));
        }
        Ok(())
    }
}
