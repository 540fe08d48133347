//! Two-stage composition of a pruning and a filtering strategy
//!
//! The pruner shrinks the list, the exact filter runs on the kept elements,
//! and the selected indices are lifted back into the coordinates of the
//! original list. Wall-clock time of both stages is measured per call,
//! averaged over a configurable number of repetitions.

use std::hint::black_box;
use std::time::Instant;

use serde::Serialize;

use crate::base::{FilteringError, K, ListIndex, MinMax, Relevance, Result, Score};
use crate::filter::spirin::FilterSpirin;
use crate::metric::SearchQualityMetric;
use crate::pruner::Pruner;

/// Outcome of running one composition on one list.
#[derive(Serialize, Clone, Debug, Default)]
pub struct TestOutcome {
    pub score: Score,
    pub indices: Vec<ListIndex>,
    /// Elements discarded by the first stage.
    pub num_elements_pruned: ListIndex,
    /// Elements surviving the first stage (the filter input size).
    pub num_elements_not_pruned: ListIndex,
    /// Milliseconds spent pruning, averaged over the runs.
    pub first_stage_time: f64,
    /// Milliseconds spent filtering, averaged over the runs.
    pub second_stage_time: f64,
    pub total_time: f64,
}

pub struct Composition {
    pub name: String,
    pub pruner: Option<Pruner>,
    pub k: K,
    pub num_runs: u32,
    /// Guaranteed maximum approximation error below the optimal score.
    pub epsilon_below: f64,
    /// Guaranteed maximum approximation error above the optimal score.
    pub epsilon_above: f64,
}

impl Composition {
    pub fn new(
        name: impl Into<String>,
        pruner: Option<Pruner>,
        k: K,
        num_runs: u32,
        epsilon_below: f64,
        epsilon_above: f64,
    ) -> Result<Self> {
        if num_runs == 0 {
            return Err(FilteringError::InvalidInput(
                "the parameter num_runs must be a strictly positive number".into(),
            ));
        }
        if epsilon_below < 0. || epsilon_above < 0. {
            return Err(FilteringError::InvalidInput(
                "the approximation error bounds must be positive floating numbers".into(),
            ));
        }
        Ok(Self {
            name: name.into(),
            pruner,
            k,
            num_runs,
            epsilon_below,
            epsilon_above,
        })
    }

    /// Runs the composition on one list and reports the solution together
    /// with stage timings. Repeated runs go through `black_box` so the
    /// optimizer cannot drop them.
    pub fn run<M: SearchQualityMetric>(
        &self,
        metric: &M,
        rel_list: &[Relevance],
        minmax: &MinMax,
    ) -> TestOutcome {
        let mut outcome = TestOutcome::default();
        let filter = FilterSpirin::new(self.k, metric);

        let filtering = if let Some(pruner) = &self.pruner {
            let start = Instant::now();
            let pruning = pruner.prune(metric, rel_list, minmax);
            for _ in 1..self.num_runs {
                black_box(pruner.prune(metric, rel_list, minmax).len());
            }
            outcome.first_stage_time = elapsed_millis(start) / f64::from(self.num_runs);

            let n2 = pruning.len();
            outcome.num_elements_pruned = (rel_list.len() - n2) as ListIndex;
            outcome.num_elements_not_pruned = n2 as ListIndex;

            // contiguous sub-list for the second stage
            let pruned_list: Vec<Relevance> = pruning
                .indices
                .iter()
                .map(|&ix| rel_list[ix as usize])
                .collect();

            let start = Instant::now();
            let mut filtering = filter.filter(&pruned_list);
            for _ in 1..self.num_runs {
                black_box(filter.filter(&pruned_list).len());
            }
            outcome.second_stage_time = elapsed_millis(start) / f64::from(self.num_runs);

            // lift the filter indices back into the original coordinates
            for ix in filtering.indices.iter_mut() {
                *ix = pruning.indices[*ix as usize];
            }
            filtering
        } else {
            let start = Instant::now();
            let filtering = filter.filter(rel_list);
            for _ in 1..self.num_runs {
                black_box(filter.filter(rel_list).len());
            }
            outcome.second_stage_time = elapsed_millis(start) / f64::from(self.num_runs);
            filtering
        };

        outcome.score = filtering.score;
        outcome.indices = filtering.indices;
        outcome.total_time = outcome.first_stage_time + outcome.second_stage_time;

        outcome
    }
}

fn elapsed_millis(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::Dcg;

    #[test]
    fn test_rejects_zero_runs() {
        assert!(Composition::new("OPT", None, 3, 0, 0., 0.).is_err());
    }

    #[test]
    fn test_remaps_pruned_indices() {
        let metric = Dcg::with_max_position(1);
        let composition =
            Composition::new("Topk-OPT", Some(Pruner::Topk { k: 1 }), 1, 1, 0.5, 0.).unwrap();
        let rel_list = [0.1, 0.1, 0.1, 9.0, 0.1];
        let outcome = composition.run(&metric, &rel_list, &MinMax::of(&rel_list));
        assert_eq!(outcome.indices, vec![3]);
        assert_eq!(outcome.num_elements_not_pruned, 1);
        assert_eq!(outcome.num_elements_pruned, 4);
    }
}
