//! Pruning strategies
//!
//! A pruner shrinks an attribute-sorted relevance list to the elements that
//! can still appear in a good filtering@k solution, keeping them in their
//! original order. The exact filter then runs on the shorter list; each
//! strategy documents the fraction of the optimal score that survives the
//! two-stage composition.

pub mod cutoff;
pub mod epspruning;
pub mod topk;

pub use cutoff::prune_cutoff;
pub use epspruning::prune_eps;
pub use topk::{prune_topk, prune_topk_positional};

use serde::{Deserialize, Serialize};

use crate::base::{K, ListIndex, MinMax, Relevance, Score};
use crate::metric::SearchQualityMetric;

/// Outcome of a pruning stage: the kept positions, strictly increasing in
/// the input list.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PrunerSolution {
    pub indices: Vec<ListIndex>,
}

impl PrunerSolution {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// The available pruning strategies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pruner {
    /// Keeps the elements above the mid-range relevance. No quality
    /// guarantee.
    Cutoff,
    /// Keeps the k largest relevances via a value heap and a second
    /// emitting pass. Guarantees half of the optimal score.
    Topk { k: K },
    /// Keeps the k largest relevances via a (relevance, position) heap and
    /// a final sort by position. Same guarantee as [`Pruner::Topk`].
    TopkPositional { k: K },
    /// Epsilon filtering: discards elements that provably cannot move the
    /// optimum by more than a factor epsilon. Guarantees `1 - epsilon` of
    /// the optimal score.
    EpsPruning { k: K, epsilon: Score },
}

impl Pruner {
    pub fn prune<M: SearchQualityMetric>(
        &self,
        metric: &M,
        rel_list: &[Relevance],
        minmax: &MinMax,
    ) -> PrunerSolution {
        match *self {
            Pruner::Cutoff => prune_cutoff(rel_list, minmax),
            Pruner::Topk { k } => prune_topk(rel_list, k),
            Pruner::TopkPositional { k } => prune_topk_positional(rel_list, k),
            Pruner::EpsPruning { k, epsilon } => prune_eps(metric, k, epsilon, rel_list, minmax),
        }
    }
}
