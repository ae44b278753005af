//! Patristic distances between leaves of the active tree.
//!
//! The raw distance of a pair is the sum of branch lengths from both leaves up
//! to their most recent common ancestor; `edges` counts those branches. Every
//! computed pair is cached with its effective distance under both orderings.
//!
//! Transform anchors come from raw distances. Both transform modes map the
//! anchors onto themselves, so they are also the extremes of the effective
//! distances. Target statistics are taken over effective distances, since
//! those are what scores are computed from.

use crate::libs::phylo::{NodeId, TreeHandle};
use crate::libs::transform::{Anchors, DistanceTransform};
use fxhash::FxHashMap;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceMetrics {
    /// Summed branch length through the MRCA
    pub raw: f64,
    /// Number of branches on the path
    pub edges: usize,
    /// `raw` after the distance transform
    pub effective: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DistanceStats {
    pub max_pairwise: f64,
    /// Smallest positive pairwise distance
    pub min_pairwise: f64,
    /// High-water mark of every max seen so far
    pub global_max_pairwise: f64,
    pub target_max: f64,
    pub target_min_positive: f64,
    pub target_scale_factor: f64,
    pub target_active: bool,
}

impl DistanceStats {
    /// Transform ceiling: the high-water mark when there is one.
    pub fn baseline_max(&self) -> f64 {
        if self.global_max_pairwise > 0.0 {
            self.global_max_pairwise
        } else {
            self.max_pairwise
        }
    }

    pub fn anchors(&self) -> Anchors {
        Anchors {
            min: self.min_pairwise,
            max: self.baseline_max(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DistanceEngine {
    cache: FxHashMap<(NodeId, NodeId), DistanceMetrics>,
    stats: DistanceStats,
    precompute_threshold: usize,
}

impl DistanceEngine {
    pub fn new(precompute_threshold: usize) -> Self {
        Self {
            cache: FxHashMap::default(),
            stats: DistanceStats::default(),
            precompute_threshold,
        }
    }

    pub fn stats(&self) -> &DistanceStats {
        &self.stats
    }

    pub fn precompute_threshold(&self) -> usize {
        self.precompute_threshold
    }

    /// Number of cached entries, both orderings counted
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Zero everything but the global high-water mark.
    pub fn reset_round_stats(&mut self) {
        self.stats = DistanceStats {
            global_max_pairwise: self.stats.global_max_pairwise,
            ..DistanceStats::default()
        };
    }

    /// Zero all statistics and drop the cache.
    pub fn reset(&mut self) {
        self.stats = DistanceStats::default();
        self.cache.clear();
    }

    pub fn clear_target(&mut self) {
        self.stats.target_max = 0.0;
        self.stats.target_min_positive = 0.0;
        self.stats.target_scale_factor = 0.0;
        self.stats.target_active = false;
    }

    /// Raw distance and edge count between two nodes.
    ///
    /// `None` when the nodes share no ancestor or a parent chain is broken.
    pub fn distance_between<T: TreeHandle>(tree: &T, a: NodeId, b: NodeId) -> Option<(f64, usize)> {
        tree.node(a)?;
        tree.node(b)?;
        if a == b {
            return Some((0.0, 0));
        }

        let lca = tree.common_ancestor(a, b)?;
        let (wa, ea) = climb(tree, a, lca)?;
        let (wb, eb) = climb(tree, b, lca)?;
        Some((wa + wb, ea + eb))
    }

    /// Cached distance between two nodes.
    pub fn get_distance<T: TreeHandle>(
        &mut self,
        tree: &T,
        transform: &DistanceTransform,
        a: NodeId,
        b: NodeId,
    ) -> Option<DistanceMetrics> {
        if let Some(metrics) = self.cache.get(&(a, b)) {
            return Some(*metrics);
        }

        let (raw, edges) = Self::distance_between(tree, a, b)?;
        let metrics = DistanceMetrics {
            raw,
            edges,
            effective: transform.apply(raw, &self.stats.anchors()),
        };
        self.store(a, b, metrics);
        Some(metrics)
    }

    /// All-pairs pass over the leaves: pairwise max/min, the high-water mark,
    /// and a fully populated cache.
    ///
    /// Trees with fewer than two leaves reset every statistic. Trees above the
    /// precompute threshold are skipped, leaving the statistics as they were.
    pub fn compute_global_stats<T: TreeHandle>(&mut self, tree: &T, transform: &DistanceTransform) {
        let leaves = tree.leaves();
        if leaves.len() < 2 {
            self.reset();
            return;
        }
        if leaves.len() > self.precompute_threshold {
            debug!(
                "{} leaves above precompute threshold {}, global stats skipped",
                leaves.len(),
                self.precompute_threshold
            );
            return;
        }

        let mut pairs = Vec::with_capacity(leaves.len() * (leaves.len() - 1) / 2);
        let mut max = 0.0f64;
        let mut min_positive = f64::INFINITY;
        for (a, b) in leaves.iter().copied().tuple_combinations() {
            let Some((raw, edges)) = Self::distance_between(tree, a, b) else {
                continue;
            };
            max = max.max(raw);
            if raw > 0.0 {
                min_positive = min_positive.min(raw);
            }
            pairs.push((a, b, raw, edges));
        }

        self.stats.max_pairwise = max;
        self.stats.min_pairwise = finite_or_zero(min_positive);
        if max > self.stats.global_max_pairwise {
            self.stats.global_max_pairwise = max;
        }

        self.cache.clear();
        let anchors = self.stats.anchors();
        for (a, b, raw, edges) in pairs {
            let effective = transform.apply(raw, &anchors);
            self.store(a, b, DistanceMetrics { raw, edges, effective });
        }

        info!(
            "Global stats over {} leaves: min {:.4}, max {:.4}, ceiling {:.4}",
            leaves.len(),
            self.stats.min_pairwise,
            self.stats.max_pairwise,
            self.stats.global_max_pairwise
        );
    }

    /// Distances from `target` to every other leaf.
    ///
    /// A raw pass may raise the high-water mark, which invalidates cached
    /// effective distances. The effective pass then fills the target's row of
    /// the cache and derives the target statistics.
    pub fn compute_target_stats<T: TreeHandle>(
        &mut self,
        tree: &T,
        transform: &DistanceTransform,
        target: NodeId,
    ) {
        let leaves = tree.leaves();
        if leaves.len() < 2 || tree.node(target).is_none() {
            self.clear_target();
            return;
        }

        let row: Vec<(NodeId, f64, usize)> = leaves
            .iter()
            .copied()
            .filter(|&leaf| leaf != target)
            .filter_map(|leaf| {
                Self::distance_between(tree, target, leaf).map(|(raw, edges)| (leaf, raw, edges))
            })
            .collect();

        let raw_max = row.iter().map(|&(_, raw, _)| raw).fold(0.0f64, f64::max);
        if raw_max > self.stats.global_max_pairwise {
            self.stats.global_max_pairwise = raw_max;
            self.cache.clear();
        }

        let anchors = self.stats.anchors();
        let mut max = 0.0f64;
        let mut min_positive = f64::INFINITY;
        for (leaf, raw, edges) in row {
            let effective = transform.apply(raw, &anchors);
            max = max.max(effective);
            if effective > 0.0 {
                min_positive = min_positive.min(effective);
            }
            self.store(target, leaf, DistanceMetrics { raw, edges, effective });
        }

        let min_positive = finite_or_zero(min_positive);
        self.stats.target_max = max;
        self.stats.target_min_positive = min_positive;
        self.stats.target_scale_factor = if max > min_positive {
            99f64.ln() / (max - min_positive)
        } else {
            0.0
        };
        self.stats.target_active = true;

        debug!(
            "Target stats: min positive {:.4}, max {:.4}, scale {:.4}",
            min_positive, max, self.stats.target_scale_factor
        );
    }

    fn store(&mut self, a: NodeId, b: NodeId, metrics: DistanceMetrics) {
        self.cache.insert((a, b), metrics);
        self.cache.insert((b, a), metrics);
    }
}

// Branch lengths and edges from `from` up to, not including, `ancestor`
fn climb<T: TreeHandle>(tree: &T, from: NodeId, ancestor: NodeId) -> Option<(f64, usize)> {
    let mut weighted = 0.0;
    let mut edges = 0;
    let mut current = from;
    while current != ancestor {
        let node = tree.node(current)?;
        weighted += node.branch_length();
        edges += 1;
        current = node.parent?;
    }
    Some((weighted, edges))
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::config::TransformConfig;
    use crate::libs::phylo::Tree;
    use crate::libs::transform::TransformMode;
    use approx::assert_relative_eq;

    const EXAMPLE: &str = "((A:1,B:1):1,(C:5,D:5):5);";

    fn leaf(tree: &Tree, name: &str) -> NodeId {
        tree.get_node_by_name(name).unwrap()
    }

    #[test]
    fn test_distance_between() {
        let tree = Tree::from_newick(EXAMPLE).unwrap();
        let (a, b, c, d) = (
            leaf(&tree, "A"),
            leaf(&tree, "B"),
            leaf(&tree, "C"),
            leaf(&tree, "D"),
        );

        assert_eq!(DistanceEngine::distance_between(&tree, a, a), Some((0.0, 0)));
        assert_eq!(DistanceEngine::distance_between(&tree, a, b), Some((2.0, 2)));
        assert_eq!(DistanceEngine::distance_between(&tree, a, c), Some((12.0, 4)));
        assert_eq!(DistanceEngine::distance_between(&tree, c, a), Some((12.0, 4)));
        assert_eq!(DistanceEngine::distance_between(&tree, c, d), Some((10.0, 2)));
        assert_eq!(DistanceEngine::distance_between(&tree, a, 99), None);
    }

    #[test]
    fn test_missing_lengths_count_as_zero() {
        let tree = Tree::from_newick("((A,B:2):1,C);").unwrap();
        let (a, b, c) = (leaf(&tree, "A"), leaf(&tree, "B"), leaf(&tree, "C"));

        assert_eq!(DistanceEngine::distance_between(&tree, a, b), Some((2.0, 2)));
        assert_eq!(DistanceEngine::distance_between(&tree, a, c), Some((1.0, 3)));
    }

    #[test]
    fn test_global_stats() {
        let tree = Tree::from_newick(EXAMPLE).unwrap();
        let mut engine = DistanceEngine::new(400);
        engine.compute_global_stats(&tree, &DistanceTransform::default());

        let stats = engine.stats();
        assert_eq!(stats.max_pairwise, 12.0);
        assert_eq!(stats.min_pairwise, 2.0);
        assert_eq!(stats.global_max_pairwise, 12.0);
        assert!(!stats.target_active);
        // 6 pairs, both orderings
        assert_eq!(engine.cache_len(), 12);
    }

    #[test]
    fn test_global_stats_above_threshold() {
        let tree = Tree::from_newick(EXAMPLE).unwrap();
        let mut engine = DistanceEngine::new(3);
        engine.compute_global_stats(&tree, &DistanceTransform::default());

        assert_eq!(engine.stats(), &DistanceStats::default());
        assert_eq!(engine.cache_len(), 0);

        // the target pass still provides a ceiling
        engine.compute_target_stats(&tree, &DistanceTransform::default(), leaf(&tree, "A"));
        assert_eq!(engine.stats().global_max_pairwise, 12.0);
        assert_eq!(engine.stats().target_max, 12.0);
    }

    #[test]
    fn test_degenerate_tree_resets() {
        let tree = Tree::from_newick(EXAMPLE).unwrap();
        let mut engine = DistanceEngine::new(400);
        engine.compute_global_stats(&tree, &DistanceTransform::default());

        let single = Tree::from_newick("A:1;").unwrap();
        engine.compute_global_stats(&single, &DistanceTransform::default());
        assert_eq!(engine.stats(), &DistanceStats::default());
        assert_eq!(engine.cache_len(), 0);

        engine.compute_target_stats(&single, &DistanceTransform::default(), 0);
        assert!(!engine.stats().target_active);
    }

    #[test]
    fn test_target_stats() {
        let tree = Tree::from_newick(EXAMPLE).unwrap();
        let transform = DistanceTransform::default();
        let mut engine = DistanceEngine::new(400);
        engine.compute_global_stats(&tree, &transform);
        engine.compute_target_stats(&tree, &transform, leaf(&tree, "A"));

        let stats = engine.stats();
        assert!(stats.target_active);
        assert_eq!(stats.target_max, 12.0);
        assert_eq!(stats.target_min_positive, 2.0);
        assert_relative_eq!(stats.target_scale_factor, 99f64.ln() / 10.0);
    }

    #[test]
    fn test_target_scale_zero_when_flat() {
        let tree = Tree::from_newick("(A:1,B:1,C:1);").unwrap();
        let mut engine = DistanceEngine::new(400);
        engine.compute_target_stats(&tree, &DistanceTransform::default(), leaf(&tree, "A"));

        assert_eq!(engine.stats().target_max, 2.0);
        assert_eq!(engine.stats().target_min_positive, 2.0);
        assert_eq!(engine.stats().target_scale_factor, 0.0);
    }

    #[test]
    fn test_get_distance_symmetric_and_cached() {
        let tree = Tree::from_newick(EXAMPLE).unwrap();
        let transform = DistanceTransform::new(&TransformConfig {
            mode: TransformMode::Log,
            strength: 0.6,
        });
        let mut engine = DistanceEngine::new(400);
        engine.compute_global_stats(&tree, &transform);
        let (a, c, d) = (leaf(&tree, "A"), leaf(&tree, "C"), leaf(&tree, "D"));

        let ac = engine.get_distance(&tree, &transform, a, c).unwrap();
        let ca = engine.get_distance(&tree, &transform, c, a).unwrap();
        assert_eq!(ac, ca);
        // anchors map onto themselves
        assert_relative_eq!(ac.effective, 12.0);

        let cd = engine.get_distance(&tree, &transform, c, d).unwrap();
        assert_eq!(cd.raw, 10.0);
        assert!(cd.effective > cd.raw);

        let aa = engine.get_distance(&tree, &transform, a, a).unwrap();
        assert_eq!((aa.raw, aa.edges, aa.effective), (0.0, 0, 0.0));
    }

    #[test]
    fn test_get_distance_without_stats() {
        let tree = Tree::from_newick(EXAMPLE).unwrap();
        let mut engine = DistanceEngine::new(400);
        let (a, b) = (leaf(&tree, "A"), leaf(&tree, "B"));

        // no anchors yet: effective equals raw
        let ab = engine
            .get_distance(&tree, &DistanceTransform::default(), a, b)
            .unwrap();
        assert_eq!(ab.effective, 2.0);
        assert_eq!(engine.cache_len(), 2);
        assert!(engine.get_distance(&tree, &DistanceTransform::default(), a, 42).is_none());
    }

    #[test]
    fn test_reset_round_stats_keeps_high_water() {
        let tree = Tree::from_newick(EXAMPLE).unwrap();
        let mut engine = DistanceEngine::new(400);
        engine.compute_global_stats(&tree, &DistanceTransform::default());
        engine.reset_round_stats();

        assert_eq!(engine.stats().max_pairwise, 0.0);
        assert_eq!(engine.stats().global_max_pairwise, 12.0);
        assert_eq!(engine.stats().baseline_max(), 12.0);
    }
}
