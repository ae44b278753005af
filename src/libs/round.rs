//! Round orchestration.
//!
//! A `RoundCoordinator` holds the loaded source tree and, once a round is
//! configured, the working tree pruned to that round's species and rerooted
//! on its target, together with the name index, the distance cache and the
//! statistics derived from them. Every call to `configure_round` rebuilds all
//! of these from the source tree.

use crate::libs::config::EngineConfig;
use crate::libs::distance::{DistanceEngine, DistanceMetrics, DistanceStats};
use crate::libs::index::SpeciesIndex;
use crate::libs::names;
use crate::libs::phylo::prune::prune_to_allowed;
use crate::libs::phylo::{NodeId, Tree, TreeHandle, TreeSnapshot};
use crate::libs::score;
use crate::libs::transform::{DistanceTransform, TransformMode};
use tracing::{debug, error, info, warn};

/// Inputs of one round, applied together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundConfiguration {
    /// Species of the round; empty means every leaf
    pub allowed: Vec<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone)]
struct ActiveRound<T> {
    tree: T,
    index: SpeciesIndex,
    target: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct RoundCoordinator<T: TreeHandle = Tree> {
    config: EngineConfig,
    original: Option<T>,
    loaded: bool,
    staged: RoundConfiguration,
    active: Option<ActiveRound<T>>,
    engine: DistanceEngine,
    transform: DistanceTransform,
}

impl Default for RoundCoordinator<Tree> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RoundCoordinator<Tree> {
    /// Read and parse a Newick file, `stdin` for standard input.
    ///
    /// Failures are logged and leave the coordinator unloaded. With `allowed`
    /// given, a round without target is configured right away.
    pub fn load_tree(&mut self, infile: &str, allowed: Option<&[String]>) {
        match crate::libs::io::read_to_string(infile) {
            Ok(text) => self.load_newick(&text, allowed),
            Err(e) => {
                error!("Failed to read tree {}: {:#}", infile, e);
                self.unload();
            }
        }
    }

    /// Like `load_tree`, for Newick text already in memory.
    pub fn load_newick(&mut self, newick: &str, allowed: Option<&[String]>) {
        match Tree::from_newick(newick) {
            Ok(tree) => {
                info!("Loaded tree with {} leaves", tree.get_leaves().len());
                self.original = Some(tree);
                self.loaded = true;
                if let Some(allowed) = allowed {
                    self.configure_round(allowed, None);
                }
            }
            Err(e) => {
                error!("Failed to parse tree: {}", e);
                self.unload();
            }
        }
    }
}

impl<T: TreeHandle> RoundCoordinator<T> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            original: None,
            loaded: false,
            staged: RoundConfiguration::default(),
            active: None,
            engine: DistanceEngine::new(config.precompute_threshold),
            transform: DistanceTransform::new(&config.transform),
        }
    }

    /// A coordinator over an already built tree.
    pub fn with_tree(config: EngineConfig, tree: T) -> Self {
        let mut coordinator = Self::new(config);
        coordinator.original = Some(tree);
        coordinator.loaded = true;
        coordinator
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a round with at least one species is active
    pub fn is_configured(&self) -> bool {
        self.active.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn staged(&self) -> &RoundConfiguration {
        &self.staged
    }

    pub fn stats(&self) -> &DistanceStats {
        self.engine.stats()
    }

    pub fn transform(&self) -> &DistanceTransform {
        &self.transform
    }

    pub fn leaf_count(&self) -> usize {
        self.active.as_ref().map_or(0, |r| r.tree.leaf_count())
    }

    /// Leaf labels of the active tree
    pub fn active_species(&self) -> Vec<String> {
        let Some(round) = &self.active else {
            return Vec::new();
        };
        round
            .tree
            .leaves()
            .into_iter()
            .filter_map(|leaf| round.tree.label(leaf).map(str::to_string))
            .collect()
    }

    /// Label of the leaf the active tree is rooted on
    pub fn target_name(&self) -> Option<&str> {
        let round = self.active.as_ref()?;
        round.tree.label(round.target?)
    }

    /// Start a round.
    ///
    /// The source tree is cloned and pruned to `allowed` (plus the target), the
    /// working tree is rerooted on the target when it is found, and all
    /// statistics are recomputed. An empty `allowed` keeps every leaf. A round
    /// with no surviving species leaves the coordinator unconfigured.
    pub fn configure_round<S: AsRef<str>>(&mut self, allowed: &[S], target: Option<&str>) {
        self.staged = RoundConfiguration {
            allowed: allowed.iter().map(|s| s.as_ref().to_string()).collect(),
            target: target
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        };

        let Some(original) = &self.original else {
            warn!("No tree loaded, round not configured");
            self.clear_round();
            return;
        };

        let mut allowed_set = names::allowed_set(&self.staged.allowed);
        if !allowed_set.is_empty() {
            if let Some(target) = &self.staged.target {
                allowed_set.extend(names::variants(target));
            }
        }

        let mut tree = original.clone();
        let removed = prune_to_allowed(&mut tree, &allowed_set);
        if tree.leaf_count() == 0 {
            warn!("No species of the round found in the tree");
            self.clear_round();
            return;
        }
        debug!("Pruned {} leaves, {} remain", removed, tree.leaf_count());

        let mut index = SpeciesIndex::build(&tree);
        let mut target_id = None;
        if let Some(target) = &self.staged.target {
            match index.lookup(target) {
                Some(id) => match tree.reroot_on(id) {
                    Ok(()) => {
                        tree.refresh();
                        index = SpeciesIndex::build(&tree);
                        target_id = index.lookup(target);
                    }
                    Err(e) => warn!("Failed to reroot on {}: {}", target, e),
                },
                None => warn!("Target {} not found in the round", target),
            }
        }

        if index.is_empty() {
            warn!("No labelled leaves in the round");
        }
        debug!(
            "Indexed {} name variants over {} leaves",
            index.len(),
            tree.leaf_count()
        );

        self.active = Some(ActiveRound {
            tree,
            index,
            target: target_id,
        });
        self.engine.clear_cache();
        self.recompute_statistics();
    }

    /// Distance between two species of the active round.
    ///
    /// `None` when no round is active or either name is not in it.
    pub fn get_phylogenetic_distance(&mut self, a: &str, b: &str) -> Option<DistanceMetrics> {
        let round = self.active.as_ref()?;
        let id_a = round.index.lookup(a)?;
        let id_b = round.index.lookup(b)?;
        self.engine
            .get_distance(&round.tree, &self.transform, id_a, id_b)
    }

    /// Score an effective distance against the current statistics.
    pub fn distance_to_score(&self, effective: Option<f64>) -> Option<u8> {
        score::distance_to_score(effective, self.engine.stats())
    }

    /// Score between two species, always from the effective distance.
    pub fn score_between(&mut self, a: &str, b: &str) -> Option<u8> {
        let metrics = self.get_phylogenetic_distance(a, b)?;
        self.distance_to_score(Some(metrics.effective))
    }

    /// Switch between `linear` and `log`.
    ///
    /// Returns false and keeps the current mode when `mode` is unknown.
    pub fn set_transform_mode(&mut self, mode: &str) -> bool {
        let mode: TransformMode = match mode.parse() {
            Ok(mode) => mode,
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };
        if self.transform.set_mode(mode) {
            self.config.transform.mode = mode;
            self.recompute_statistics();
        }
        true
    }

    /// Set the weight of the log component.
    ///
    /// Returns false and keeps the current strength when it is not finite.
    pub fn set_transform_strength(&mut self, strength: f64) -> bool {
        match self.transform.set_strength(strength) {
            Ok(changed) => {
                if changed {
                    self.config.transform.strength = self.transform.strength();
                    self.recompute_statistics();
                }
                true
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    /// Plain copy of the active tree
    pub fn active_tree_snapshot(&self) -> Option<TreeSnapshot> {
        self.active.as_ref().and_then(|r| r.tree.snapshot())
    }

    pub fn active_tree(&self) -> Option<&T> {
        self.active.as_ref().map(|r| &r.tree)
    }

    // Drop every cached effective distance and derive the statistics again
    fn recompute_statistics(&mut self) {
        self.engine.clear_cache();
        self.engine.reset_round_stats();

        let Some(round) = &self.active else {
            return;
        };
        self.engine.compute_global_stats(&round.tree, &self.transform);
        match round.target {
            Some(target) => self
                .engine
                .compute_target_stats(&round.tree, &self.transform, target),
            None => self.engine.clear_target(),
        }
    }

    fn clear_round(&mut self) {
        self.active = None;
        self.engine.reset();
    }

    fn unload(&mut self) {
        self.original = None;
        self.loaded = false;
        self.clear_round();
    }
}
