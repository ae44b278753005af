use super::handle::TreeHandle;
use super::node::NodeId;
use crate::libs::names::{self, AllowedSet};
use fxhash::FxHashSet;

/// Restrict a working tree to the leaves whose labels match `allowed`.
///
/// Post-order pass: a disallowed leaf is detached, and an internal node left
/// without children goes with it. A root with a single surviving child is then
/// replaced by that child until the root branches. If nothing survives, the
/// tree is left without a root. Ids are reassigned afterwards.
///
/// Returns the number of leaves removed.
pub fn prune_to_allowed<T: TreeHandle>(tree: &mut T, allowed: &AllowedSet) -> usize {
    let order = tree.postorder();
    let original_leaves: FxHashSet<NodeId> = order
        .iter()
        .copied()
        .filter(|&id| tree.node(id).is_some_and(|n| n.is_leaf()))
        .collect();

    let mut removed = 0;
    for id in order {
        let Some(node) = tree.node(id) else {
            continue;
        };
        if original_leaves.contains(&id) {
            if !names::is_allowed(node.name.as_deref(), allowed) {
                tree.remove_node(id);
                removed += 1;
            }
        } else if node.children.is_empty() {
            tree.remove_node(id);
        }
    }

    while let Some(root) = tree.root() {
        match tree.node(root).map(|n| n.children.as_slice()) {
            Some(&[only_child]) => {
                tree.promote_root(only_child);
                if tree.root() == Some(root) {
                    break;
                }
            }
            _ => break,
        }
    }

    tree.refresh();
    removed
}
