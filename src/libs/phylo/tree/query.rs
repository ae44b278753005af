use super::Tree;
use crate::libs::phylo::error::TreeError;
use crate::libs::phylo::node::NodeId;

pub fn get_path_from_root(tree: &Tree, id: &NodeId) -> Result<Vec<NodeId>, TreeError> {
    let mut path = Vec::new();
    let mut current = *id;

    if tree.get_node(current).is_none() {
        return Err(TreeError::NodeNotFound(current));
    }

    loop {
        path.push(current);
        if path.len() > tree.nodes.len() {
            return Err(TreeError::LogicError("Cycle detected in parent chain".to_string()));
        }
        match tree.nodes[current].parent {
            Some(p) => current = p,
            None => break,
        }
    }

    path.reverse();
    if tree.root != Some(path[0]) {
        return Err(TreeError::LogicError(format!(
            "Node {} is detached from root",
            id
        )));
    }

    Ok(path)
}

/// Find Lowest Common Ancestor (LCA) of two nodes.
///
/// With node heights computed, both nodes climb to equal depth and then in
/// lockstep; otherwise the two root paths are compared.
pub fn get_common_ancestor(tree: &Tree, a: &NodeId, b: &NodeId) -> Result<NodeId, TreeError> {
    if let (Some(mut da), Some(mut db)) = (tree.get_depth(*a), tree.get_depth(*b)) {
        let (mut u, mut v) = (*a, *b);
        let parent_of = |id: NodeId| {
            tree.get_node(id)
                .and_then(|n| n.parent)
                .ok_or_else(|| TreeError::LogicError(format!("Broken parent chain at node {}", id)))
        };
        while da > db {
            u = parent_of(u)?;
            da -= 1;
        }
        while db > da {
            v = parent_of(v)?;
            db -= 1;
        }
        while u != v {
            u = parent_of(u)?;
            v = parent_of(v)?;
        }
        return Ok(u);
    }

    let path_a = get_path_from_root(tree, a)?;
    let path_b = get_path_from_root(tree, b)?;

    path_a
        .iter()
        .zip(path_b.iter())
        .take_while(|(u, v)| u == v)
        .last()
        .map(|(u, _)| *u)
        .ok_or_else(|| {
            TreeError::LogicError("Nodes are not in the same tree (no common ancestor)".to_string())
        })
}

/// Get node ID by name. Returns first match.
pub fn get_node_by_name(tree: &Tree, name: &str) -> Option<NodeId> {
    tree.nodes
        .iter()
        .find(|n| !n.deleted && n.name.as_deref() == Some(name))
        .map(|n| n.id)
}
