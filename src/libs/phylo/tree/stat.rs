use super::{traversal, Tree, TreeCache};
use crate::libs::phylo::node::NodeId;

/// Get IDs of all leaves in subtree rooted at `id`, in preorder.
pub fn get_leaves(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    traversal::preorder(tree, id)
        .into_iter()
        .filter(|&n| tree.get_node(n).is_some_and(|node| node.is_leaf()))
        .collect()
}

/// Get names of the given leaves.
pub fn get_leaf_names(tree: &Tree, leaves: &[NodeId]) -> Vec<Option<String>> {
    leaves
        .iter()
        .map(|&leaf_id| tree.get_node(leaf_id).and_then(|n| n.name.clone()))
        .collect()
}

/// Leaf list and edge depth of every reachable node.
pub(super) fn build_cache(tree: &Tree) -> TreeCache {
    let mut cache = TreeCache {
        leaves: Vec::new(),
        depths: vec![0; tree.nodes.len()],
    };
    let Some(root) = tree.get_root() else {
        return cache;
    };

    for id in traversal::preorder(tree, root) {
        let Some(node) = tree.get_node(id) else {
            continue;
        };
        if let Some(parent) = node.parent {
            cache.depths[id] = cache.depths[parent] + 1;
        }
        if node.is_leaf() {
            cache.leaves.push(id);
        }
    }

    cache
}
