/// NodeId is an index into the Tree's node vector.
/// It is lightweight (Copy) and only valid until the tree is compacted again.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identifier for the node (index in the arena)
    pub id: NodeId,

    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,

    /// List of child node IDs
    pub children: Vec<NodeId>,

    // --- Payload ---
    /// Species label. Only leaves carry one in the game trees.
    pub name: Option<String>,

    /// Branch length to parent
    /// In rooted trees, edge length is an attribute of the child node.
    pub length: Option<f64>,

    /// Soft deletion flag.
    /// Use Tree::compact() to permanently remove deleted nodes and reassign ids.
    pub deleted: bool,
}

impl Node {
    /// Create a new empty node with a specific ID
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            length: None,
            deleted: false,
        }
    }

    /// Set the name of the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Branch length to the parent, a missing length counts as zero
    pub fn branch_length(&self) -> f64 {
        self.length.unwrap_or(0.0)
    }

    /// Check if the node is a leaf (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
