use super::{traversal, Tree};
use crate::libs::phylo::error::TreeError;
use crate::libs::phylo::node::{Node, NodeId};

/// Add a child to a parent node.
/// Updates both parent's `children` list and child's `parent` field.
pub fn add_child(tree: &mut Tree, parent_id: NodeId, child_id: NodeId) -> Result<(), TreeError> {
    // Validation
    if parent_id == child_id {
        return Err(TreeError::LogicError(
            "Cannot add node as child of itself".to_string(),
        ));
    }
    if tree.get_node(parent_id).is_none() {
        return Err(TreeError::NodeNotFound(parent_id));
    }
    if tree.get_node(child_id).is_none() {
        return Err(TreeError::NodeNotFound(child_id));
    }

    // Check if child already has a parent
    if let Some(old_parent) = tree.nodes[child_id].parent {
        return Err(TreeError::LogicError(format!(
            "Node {} already has parent {}",
            child_id, old_parent
        )));
    }

    // Link
    tree.nodes[child_id].parent = Some(parent_id);
    tree.nodes[parent_id].children.push(child_id);
    tree.cache = None;

    Ok(())
}

/// Soft remove a node and its descendants (optional recursive).
/// If recursive is false, children are orphaned (parent set to None).
pub fn remove_node(tree: &mut Tree, id: NodeId, recursive: bool) {
    if id >= tree.nodes.len() || tree.nodes[id].deleted {
        return;
    }

    // 1. Detach from parent
    if let Some(parent_id) = tree.nodes[id].parent {
        if let Some(parent) = tree.get_node_mut(parent_id) {
            parent.children.retain(|&child| child != id);
        }
    }

    // 2. Handle children
    let children = std::mem::take(&mut tree.nodes[id].children);
    for child_id in children {
        if recursive {
            remove_node(tree, child_id, true);
        } else if let Some(child) = tree.get_node_mut(child_id) {
            child.parent = None;
        }
    }

    // 3. Mark as deleted
    let node = &mut tree.nodes[id];
    node.deleted = true;
    node.parent = None;

    // 4. Update root if needed
    if tree.root == Some(id) {
        tree.root = None;
    }
    tree.cache = None;
}

/// Collapse a node, removing it and connecting its children to its parent.
/// Edge lengths are summed (parent->node + node->child).
pub fn collapse_node(tree: &mut Tree, id: NodeId) -> Result<(), TreeError> {
    let node = tree.get_node(id).ok_or(TreeError::NodeNotFound(id))?;
    let parent_id = node.parent.ok_or_else(|| {
        TreeError::LogicError("Cannot collapse root node".to_string())
    })?;
    let parent_edge = node.length;
    let children = node.children.clone();

    // 1. Re-parent children
    for &child_id in &children {
        if let Some(child) = tree.get_node_mut(child_id) {
            child.parent = Some(parent_id);
            child.length = match (parent_edge, child.length) {
                (Some(p), Some(c)) => Some(p + c),
                (Some(p), None) => Some(p),
                (None, c) => c,
            };
        }
    }

    // 2. Splice children into the parent's list at the node's position
    if let Some(parent) = tree.get_node_mut(parent_id) {
        if let Some(pos) = parent.children.iter().position(|&x| x == id) {
            parent.children.splice(pos..pos + 1, children);
        }
    }

    // 3. Mark deleted
    let node = &mut tree.nodes[id];
    node.deleted = true;
    node.children.clear();
    node.parent = None;
    tree.cache = None;

    Ok(())
}

/// Compact the tree: drop soft-deleted and unreachable nodes and renumber
/// the survivors sequentially in preorder, so the root becomes 0.
/// This invalidates all existing NodeIds held outside!
pub fn compact(tree: &mut Tree) {
    let Some(root) = tree.root else {
        tree.nodes.clear();
        tree.cache = None;
        return;
    };

    let order = traversal::preorder(tree, root);
    let mut old_to_new = vec![None; tree.nodes.len()];
    for (new_id, &old_id) in order.iter().enumerate() {
        old_to_new[old_id] = Some(new_id);
    }

    let remap = |id: NodeId| old_to_new.get(id).copied().flatten();
    let new_nodes: Vec<Node> = order
        .iter()
        .map(|&old_id| {
            let mut node = tree.nodes[old_id].clone();
            node.id = remap(old_id).unwrap_or(old_id);
            node.parent = node.parent.and_then(remap);
            node.children = node.children.iter().filter_map(|&c| remap(c)).collect();
            node
        })
        .collect();

    tree.nodes = new_nodes;
    tree.root = Some(0);
    tree.cache = None;
}

/// Insert a node in the middle of the desired node and its parent.
/// Returns the new parent node ID.
pub fn insert_parent(tree: &mut Tree, id: NodeId) -> Result<NodeId, TreeError> {
    let node = tree.get_node(id).ok_or(TreeError::NodeNotFound(id))?;
    let parent = node
        .parent
        .ok_or_else(|| TreeError::LogicError("Node has no parent".to_string()))?;
    let new_length = node.length.map(|l| l / 2.0);

    let new_node = tree.add_node();

    // Link parent -> new_node
    add_child(tree, parent, new_node)?;
    tree.nodes[new_node].length = new_length;

    // Unlink parent -> id
    tree.nodes[parent].children.retain(|&c| c != id);
    tree.nodes[id].parent = None;

    // Link new_node -> id
    add_child(tree, new_node, id)?;
    tree.nodes[id].length = new_length;

    Ok(new_node)
}

/// Make `child_id` the root, dropping the current root.
/// The promoted node loses its branch length, which has no meaning above a root.
pub fn promote_root(tree: &mut Tree, child_id: NodeId) {
    let Some(old_root) = tree.root else {
        return;
    };
    if tree.get_node(child_id).and_then(|n| n.parent) != Some(old_root) {
        return;
    }

    tree.root = Some(child_id);
    remove_node(tree, old_root, false);
    if let Some(node) = tree.get_node_mut(child_id) {
        node.length = None;
    }
}

/// Reroot the tree at the specified node.
/// This reverses the direction of edges along the path from the old root to the new root.
pub fn reroot_at(tree: &mut Tree, new_root_id: NodeId) -> Result<(), TreeError> {
    if tree.get_node(new_root_id).is_none() {
        return Err(TreeError::NodeNotFound(new_root_id));
    }

    let old_root_id = tree
        .root
        .ok_or_else(|| TreeError::LogicError("Tree has no root".to_string()))?;
    if old_root_id == new_root_id {
        return Ok(());
    }

    // 1. Get path from old root to new root
    let path = tree.get_path_from_root(&new_root_id)?;

    // 2. Collect edge lengths along the path
    // path[i]'s length represents edge (path[i-1] -> path[i])
    let lengths: Vec<Option<f64>> = path.iter().map(|&id| tree.nodes[id].length).collect();

    // 3. Reverse edges
    for i in (1..path.len()).rev() {
        let child_id = path[i];
        let parent_id = path[i - 1];

        tree.nodes[parent_id].children.retain(|&x| x != child_id);
        tree.nodes[child_id].children.push(parent_id);

        let parent = &mut tree.nodes[parent_id];
        parent.parent = Some(child_id);
        parent.length = lengths[i];
    }

    // 4. Finalize new root
    let new_root = &mut tree.nodes[new_root_id];
    new_root.parent = None;
    new_root.length = None;

    tree.root = Some(new_root_id);
    tree.cache = None;

    Ok(())
}

/// Reroot on the branch above `id`.
///
/// A new root is inserted at the midpoint of that branch. The old root is
/// spliced out when it is left with a single child, and dropped when it is
/// left with none, so every leaf-to-leaf path keeps its length and a leaf
/// stays a leaf.
pub fn reroot_on(tree: &mut Tree, id: NodeId) -> Result<(), TreeError> {
    let old_root = tree
        .root
        .ok_or_else(|| TreeError::LogicError("Tree has no root".to_string()))?;
    if tree.get_node(id).is_none() {
        return Err(TreeError::NodeNotFound(id));
    }
    if id == old_root {
        return Ok(());
    }

    let new_root = insert_parent(tree, id)?;
    reroot_at(tree, new_root)?;

    let remaining = tree.get_node(old_root).map(|n| n.children.len());
    match remaining {
        Some(0) => remove_node(tree, old_root, false),
        Some(1) => collapse_node(tree, old_root)?,
        _ => {}
    }

    Ok(())
}
