use crate::base::{ListIndex, MinMax, Relevance};
use crate::pruner::PrunerSolution;

/// Keeps every element whose relevance reaches the middle of the observed
/// relevance range. A single pass with no quality guarantee: a list with one
/// outlier may lose everything the filter would have selected.
pub fn prune_cutoff(rel_list: &[Relevance], minmax: &MinMax) -> PrunerSolution {
    let cutoff = 0.5 * minmax.min + 0.5 * minmax.max;

    let mut solution = PrunerSolution::default();
    solution.indices.reserve(rel_list.len());
    for (i, &relevance) in rel_list.iter().enumerate() {
        if relevance >= cutoff {
            solution.indices.push(i as ListIndex);
        }
    }

    solution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mid_range_threshold() {
        let rel_list = [1., 6., 2., 8., 5.];
        let solution = prune_cutoff(&rel_list, &MinMax::of(&rel_list));
        // cutoff is 4.5
        assert_eq!(solution.indices, vec![1, 3, 4]);
    }

    #[test]
    fn test_uniform_list_keeps_everything() {
        let rel_list = [3., 3., 3.];
        let solution = prune_cutoff(&rel_list, &MinMax::of(&rel_list));
        assert_eq!(solution.indices, vec![0, 1, 2]);
    }
}
