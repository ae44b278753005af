pub mod io;
pub mod ops;
pub mod query;
pub mod stat;
pub mod traversal;

pub use io::TreeSnapshot;

use super::error::TreeError;
use super::handle::TreeHandle;
use super::node::{Node, NodeId};

/// Derived per-tree data. Rebuilt after every topology change.
#[derive(Debug, Default, Clone)]
pub(super) struct TreeCache {
    /// Live leaves in preorder
    pub(super) leaves: Vec<NodeId>,
    /// Edge count from the root, indexed by NodeId
    pub(super) depths: Vec<usize>,
}

#[derive(Debug, Default, Clone)]
pub struct Tree {
    /// Arena storage for all nodes
    pub(super) nodes: Vec<Node>,

    /// Optional root ID (a tree might be empty or in construction)
    pub(super) root: Option<NodeId>,

    /// Leaf list and node heights; None until computed
    pub(super) cache: Option<TreeCache>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node to the tree. Returns the new node's ID.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        let node = Node::new(id);
        self.nodes.push(node);
        self.cache = None;
        id
    }

    /// Get number of nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.deleted).count()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get root ID
    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a reference to a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).filter(|n| !n.deleted)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).filter(|n| !n.deleted)
    }

    /// Set a node as the root of the tree.
    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
            self.cache = None;
        }
    }

    // --- Delegation to ops ---

    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), TreeError> {
        ops::add_child(self, parent_id, child_id)
    }

    pub fn remove_node(&mut self, id: NodeId, recursive: bool) {
        ops::remove_node(self, id, recursive)
    }

    pub fn collapse_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        ops::collapse_node(self, id)
    }

    pub fn compact(&mut self) {
        ops::compact(self)
    }

    pub fn insert_parent(&mut self, child_id: NodeId) -> Result<NodeId, TreeError> {
        ops::insert_parent(self, child_id)
    }

    pub fn promote_root(&mut self, child_id: NodeId) {
        ops::promote_root(self, child_id)
    }

    pub fn reroot_at(&mut self, new_root_id: NodeId) -> Result<(), TreeError> {
        ops::reroot_at(self, new_root_id)
    }

    pub fn reroot_on(&mut self, id: NodeId) -> Result<(), TreeError> {
        ops::reroot_on(self, id)
    }

    // --- Delegation to traversal ---

    pub fn preorder(&self, start_node: &NodeId) -> Vec<NodeId> {
        traversal::preorder(self, *start_node)
    }

    pub fn postorder(&self, start_node: &NodeId) -> Vec<NodeId> {
        traversal::postorder(self, *start_node)
    }

    // --- Delegation to query ---

    pub fn get_path_from_root(&self, id: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        query::get_path_from_root(self, id)
    }

    pub fn get_common_ancestor(&self, a: &NodeId, b: &NodeId) -> Result<NodeId, TreeError> {
        query::get_common_ancestor(self, a, b)
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<NodeId> {
        query::get_node_by_name(self, name)
    }

    /// Edge count between the root and `id`, if heights have been computed.
    pub fn get_depth(&self, id: NodeId) -> Option<usize> {
        self.cache.as_ref().and_then(|c| c.depths.get(id).copied())
    }

    // --- Delegation to stat ---

    /// Live leaves in preorder. Served from the cache when it is fresh.
    pub fn get_leaves(&self) -> Vec<NodeId> {
        if let Some(cache) = &self.cache {
            return cache.leaves.clone();
        }
        match self.root {
            Some(root) => stat::get_leaves(self, root),
            None => Vec::new(),
        }
    }

    pub fn get_leaf_names(&self) -> Vec<Option<String>> {
        stat::get_leaf_names(self, &self.get_leaves())
    }

    /// Recompute the leaf list and per-node depths.
    pub fn compute_node_heights(&mut self) {
        self.cache = Some(stat::build_cache(self));
    }

    pub fn clear_caches(&mut self) {
        self.cache = None;
    }

    // --- Delegation to io ---

    pub fn to_newick(&self) -> String {
        io::to_newick(self)
    }

    pub fn snapshot(&self) -> Option<TreeSnapshot> {
        io::snapshot(self)
    }
}

impl TreeHandle for Tree {
    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.get_node(id)
    }

    fn leaves(&self) -> Vec<NodeId> {
        self.get_leaves()
    }

    fn postorder(&self) -> Vec<NodeId> {
        match self.root {
            Some(root) => traversal::postorder(self, root),
            None => Vec::new(),
        }
    }

    fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        query::get_common_ancestor(self, &a, &b).ok()
    }

    fn remove_node(&mut self, id: NodeId) {
        ops::remove_node(self, id, true)
    }

    fn promote_root(&mut self, child_id: NodeId) {
        ops::promote_root(self, child_id)
    }

    fn reroot_on(&mut self, id: NodeId) -> Result<(), TreeError> {
        ops::reroot_on(self, id)
    }

    fn reassign_node_ids(&mut self) {
        ops::compact(self)
    }

    fn compute_node_heights(&mut self) {
        Tree::compute_node_heights(self)
    }

    fn clear_caches(&mut self) {
        Tree::clear_caches(self)
    }

    fn snapshot(&self) -> Option<TreeSnapshot> {
        io::snapshot(self)
    }
}
