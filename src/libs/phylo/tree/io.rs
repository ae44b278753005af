use super::Tree;
use crate::libs::phylo::node::NodeId;
use serde::Serialize;

/// Plain recursive copy of a tree for read-only consumers (charts, diagrams).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeSnapshot {
    pub label: Option<String>,
    pub branch_length: f64,
    pub children: Vec<TreeSnapshot>,
}

impl TreeSnapshot {
    /// Labels of all leaves, left to right
    pub fn leaf_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.children.is_empty() {
                labels.extend(node.label.clone());
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        labels
    }
}

/// Serialize tree to Newick string.
pub fn to_newick(tree: &Tree) -> String {
    match tree.get_root() {
        Some(root) => {
            let mut s = to_newick_recursive(tree, root);
            s.push(';');
            s
        }
        None => ";".to_string(),
    }
}

fn to_newick_recursive(tree: &Tree, node_id: NodeId) -> String {
    let Some(node) = tree.get_node(node_id) else {
        return String::new();
    };

    let mut node_info = String::new();
    if let Some(name) = &node.name {
        node_info.push_str(&quote_label(name));
    }
    if let Some(len) = node.length {
        node_info.push_str(&format!(":{}", len));
    }

    if node.children.is_empty() {
        node_info
    } else {
        let children_strs: Vec<String> = node
            .children
            .iter()
            .map(|&child| to_newick_recursive(tree, child))
            .collect();
        format!("({}){}", children_strs.join(","), node_info)
    }
}

fn quote_label(label: &str) -> String {
    let needs_quote = label.chars().any(|c| "(),:;[] \t\n".contains(c));
    if needs_quote {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

/// Deep copy of the reachable tree as a `TreeSnapshot`.
pub fn snapshot(tree: &Tree) -> Option<TreeSnapshot> {
    tree.get_root().map(|root| snapshot_recursive(tree, root))
}

fn snapshot_recursive(tree: &Tree, node_id: NodeId) -> TreeSnapshot {
    match tree.get_node(node_id) {
        Some(node) => TreeSnapshot {
            label: node.name.clone(),
            branch_length: node.branch_length(),
            children: node
                .children
                .iter()
                .map(|&child| snapshot_recursive(tree, child))
                .collect(),
        },
        None => TreeSnapshot {
            label: None,
            branch_length: 0.0,
            children: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_newick() {
        let mut tree = Tree::new();
        //    Root
        //   /    \
        //  A:0.1  B:0.2
        let n0 = tree.add_node();
        let n1 = tree.add_node();
        let n2 = tree.add_node();

        tree.set_root(n0);
        tree.add_child(n0, n1).unwrap();
        tree.add_child(n0, n2).unwrap();

        tree.get_node_mut(n0).unwrap().set_name("Root");
        tree.get_node_mut(n1).unwrap().set_name("A");
        tree.get_node_mut(n1).unwrap().length = Some(0.1);
        tree.get_node_mut(n2).unwrap().set_name("Homo sapiens");
        tree.get_node_mut(n2).unwrap().length = Some(0.2);

        assert_eq!(to_newick(&tree), "(A:0.1,'Homo sapiens':0.2)Root;");
        assert_eq!(to_newick(&Tree::new()), ";");
    }

    #[test]
    fn test_snapshot() {
        let tree = Tree::from_newick("((A:1,B:2):3,C:4);").unwrap();
        let snap = snapshot(&tree).unwrap();

        assert_eq!(snap.label, None);
        assert_eq!(snap.branch_length, 0.0);
        assert_eq!(snap.children.len(), 2);
        assert_eq!(snap.children[0].branch_length, 3.0);
        assert_eq!(snap.children[1].label.as_deref(), Some("C"));
        assert_eq!(snap.leaf_labels(), vec!["A", "B", "C"]);

        let json = serde_json::to_string(&snap.children[1]).unwrap();
        assert_eq!(
            json,
            r#"{"label":"C","branch_length":4.0,"children":[]}"#
        );
    }
}
