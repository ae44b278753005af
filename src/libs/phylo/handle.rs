//! The narrow tree interface the scoring engine is written against.
//!
//! Pruning, indexing, distance and round orchestration only need these
//! operations, so any arena that implements them can be plugged in,
//! including hand-built fixtures in tests.

use super::error::TreeError;
use super::node::{Node, NodeId};
use super::tree::TreeSnapshot;

pub trait TreeHandle: Clone {
    /// Root node, None for an empty tree
    fn root(&self) -> Option<NodeId>;

    /// A live node by id
    fn node(&self, id: NodeId) -> Option<&Node>;

    /// All live nodes without children
    fn leaves(&self) -> Vec<NodeId>;

    /// Node ids from the root, children before parents
    fn postorder(&self) -> Vec<NodeId>;

    /// Most recent common ancestor of two nodes
    fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId>;

    /// Detach a node (and its descendants) from the tree
    fn remove_node(&mut self, id: NodeId);

    /// Make a child of the current root the new root, dropping the old root
    fn promote_root(&mut self, child_id: NodeId);

    /// Reroot on the branch above `id`
    fn reroot_on(&mut self, id: NodeId) -> Result<(), TreeError>;

    /// Renumber live nodes sequentially. Invalidates every NodeId held outside.
    fn reassign_node_ids(&mut self);

    fn compute_node_heights(&mut self);

    fn clear_caches(&mut self);

    /// Plain recursive copy for read-only consumers
    fn snapshot(&self) -> Option<TreeSnapshot>;

    fn label(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|n| n.name.as_deref())
    }

    fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Bookkeeping after a topology change
    fn refresh(&mut self) {
        self.clear_caches();
        self.reassign_node_ids();
        self.compute_node_heights();
    }
}
