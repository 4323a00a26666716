//! Root-ownership table
//!
//! Maps each parentless node to the number of live selection entries that
//! reach it through its subtree. A key exists only while its count is at
//! least one; attached nodes never appear as keys.

use crate::types::NodeId;
use ahash::AHashMap;

#[derive(Debug, Default)]
pub struct RootTable {
    counts: AHashMap<NodeId, usize>,
}

impl RootTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, root: NodeId, by: usize) {
        if by == 0 {
            return;
        }
        *self.counts.entry(root).or_insert(0) += by;
    }

    /// Lower the count and return what is left.
    ///
    /// The entry is erased when it reaches zero. `None` means the root had
    /// no entry at all, which callers must not treat as "free it".
    pub fn decrement(&mut self, root: NodeId, by: usize) -> Option<usize> {
        let count = self.counts.get_mut(&root)?;
        if *count < by {
            tracing::warn!(%root, count = *count, by, "Ownership count underflow");
            *count = 0;
        } else {
            *count -= by;
        }

        let remaining = *count;
        if remaining == 0 {
            self.counts.remove(&root);
        }
        Some(remaining)
    }

    /// Drop the entry of a node that gained a parent
    pub fn forget(&mut self, root: NodeId) -> Option<usize> {
        self.counts.remove(&root)
    }

    pub fn count(&self, root: NodeId) -> usize {
        self.counts.get(&root).copied().unwrap_or(0)
    }

    pub fn contains(&self, root: NodeId) -> bool {
        self.counts.contains_key(&root)
    }

    /// Number of distinct live roots
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.counts.iter().map(|(&root, &count)| (root, count))
    }
}
