//! Epsilon filtering
//!
//! Partitions the gain axis into geometric intervals of ratio `1 - epsilon`.
//! Within one interval at most k elements can matter, and every element whose
//! gain falls below a derived minimum cannot change the optimum by more than
//! a factor epsilon. Scanning the list right to left with a k-element value
//! heap keeps exactly the survivors; the filter run on them scores at least
//! `1 - epsilon` of the optimum over the full list.

use log::debug;

use crate::base::{K, ListIndex, MinMax, Relevance, Score};
use crate::heapq::MinHeap;
use crate::metric::SearchQualityMetric;
use crate::pruner::PrunerSolution;

fn rel_less(a: &Relevance, b: &Relevance) -> bool {
    a < b
}

/// Prunes `rel_list` down to the elements that can still participate in a
/// `(1 - epsilon)`-optimal filtering@k solution.
pub fn prune_eps<M: SearchQualityMetric>(
    metric: &M,
    k: K,
    epsilon: Score,
    rel_list: &[Relevance],
    minmax: &MinMax,
) -> PrunerSolution {
    let n = rel_list.len();
    let k = usize::from(k);
    if k == 0 {
        return PrunerSolution::default();
    }
    let delta = 1. - epsilon;

    let max_gain = metric.gain(minmax.max);
    let mut min_gain = metric.gain(minmax.min).max(
        // the total contribution of the elements ranked after the maximum
        // must stay below epsilon times the maximum's own contribution
        (epsilon * max_gain * metric.discount(1)) / (delta * metric.discount_sum(2, k)),
    );
    if !min_gain.is_finite() || min_gain > max_gain {
        // an aggressive epsilon with a small k can push the bound past the
        // maximum gain (k = 1 even divides by zero); only the maximal
        // elements can matter then
        min_gain = max_gain;
    }
    // counters gain_inverse overshoot; the second workaround below walks the
    // threshold further down in shrinking decimal steps
    let min_gain = (f64::from(min_gain) * (1. - 1e-16)) as Score;
    let mut min_threshold = metric.gain_inverse(min_gain);
    let mut step = 16;
    while step > 0 && metric.gain(min_threshold) > min_gain {
        min_threshold = metric.gain_inverse((f64::from(min_gain) - 0.1f64.powi(step)) as Score);
        step -= 1;
    }

    // geometric interval boundaries over [min_gain, max_gain], materialized
    // in relevance space from right to left
    let num_boundaries =
        1 + (1. + ((min_gain / max_gain).log2() / delta.log2()).ceil()) as usize;
    let mut boundaries = vec![0. as Relevance; num_boundaries];
    let mut gain = f64::from(max_gain);
    for boundary in boundaries.iter_mut().rev() {
        *boundary = metric.gain_inverse(gain as Score);
        gain *= f64::from(delta);
    }
    if let Some(last) = boundaries.last_mut() {
        // the inverse may not reproduce the maximum exactly
        *last = minmax.max;
    }
    debug_assert!(boundaries[0] <= min_threshold);
    debug!(
        "eps-pruning with epsilon={}: {} gain intervals, min threshold {}",
        epsilon, num_boundaries, min_threshold
    );

    let mut solution = PrunerSolution::default();
    solution.indices.reserve((num_boundaries * k).min(n));

    // collect the rightmost k elements passing the minimum threshold
    let mut kept = Vec::with_capacity(k);
    let mut i = n;
    while i > 0 {
        i -= 1;
        if rel_list[i] >= min_threshold {
            solution.indices.push(i as ListIndex);
            kept.push(rel_list[i]);
            if kept.len() == k {
                break;
            }
        }
    }
    if kept.is_empty() {
        return solution;
    }
    let mut heap = MinHeap::from_vec(kept, rel_less);

    // move the threshold up to the interval holding the current k-th best
    let mut min_interval_id = 0;
    while boundaries[min_interval_id] < *heap.peek().expect("should not happen") {
        min_interval_id += 1;
    }
    let mut min_threshold = boundaries[min_interval_id];

    while i > 0 {
        i -= 1;
        if rel_list[i] <= min_threshold {
            continue;
        }
        solution.indices.push(i as ListIndex);
        heap.replace(rel_list[i]);

        let top = *heap.peek().expect("should not happen");
        if boundaries[min_interval_id] < top {
            min_interval_id += 1;
            while boundaries[min_interval_id] < top {
                min_interval_id += 1;
            }
            // once the k-th best sits in the last interval nothing to the
            // left can displace it
            if min_interval_id == num_boundaries - 1 {
                break;
            }
            min_threshold = boundaries[min_interval_id];
        }
    }

    // collected from right to left
    solution.indices.reverse();

    solution
}
