use crate::libs::names;
use crate::libs::phylo::{NodeId, TreeHandle};
use fxhash::FxHashMap;

/// Name-variant lookup over the leaves of one tree.
///
/// Node ids are only valid for the tree the index was built from; rebuild it
/// after every prune or reroot.
#[derive(Debug, Default, Clone)]
pub struct SpeciesIndex {
    by_variant: FxHashMap<String, NodeId>,
}

impl SpeciesIndex {
    /// Register every variant of every leaf label, in leaf order.
    ///
    /// Spellings of the labels themselves go in before any `Genus_species`
    /// reduction, so a shortened name never shadows another leaf's own
    /// label. Within each pass the first leaf holding a variant keeps it.
    pub fn build<T: TreeHandle>(tree: &T) -> Self {
        let labelled: Vec<(NodeId, &str)> = tree
            .leaves()
            .into_iter()
            .filter_map(|leaf| tree.label(leaf).map(|label| (leaf, label)))
            .collect();

        let mut by_variant = FxHashMap::default();
        for (leaf, label) in &labelled {
            for variant in names::spellings(label) {
                by_variant.entry(variant).or_insert(*leaf);
            }
        }
        for (leaf, label) in &labelled {
            for variant in names::variants(label) {
                by_variant.entry(variant).or_insert(*leaf);
            }
        }
        Self { by_variant }
    }

    /// First leaf matching any variant of `name`.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        names::variants(name)
            .iter()
            .find_map(|v| self.by_variant.get(v).copied())
    }

    /// Number of registered variants
    pub fn len(&self) -> usize {
        self.by_variant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_variant.is_empty()
    }
}
