//! Top-k pruning
//!
//! Keeping the k largest relevances (in list order) loses at most half of
//! the optimal score under a monotone non-increasing discount. Two
//! renditions of the same idea: one heaps bare relevance values and needs a
//! second pass over the list to emit positions, the other heaps
//! (relevance, position) pairs and sorts them at the end. With tied
//! relevances the two may keep different, equally valid, k-subsets.

use crate::base::{K, ListIndex, Relevance};
use crate::heapq::MinHeap;
use crate::pruner::PrunerSolution;

fn identity_solution(n: usize) -> PrunerSolution {
    PrunerSolution {
        indices: (0..n as ListIndex).collect(),
    }
}

fn rel_less(a: &Relevance, b: &Relevance) -> bool {
    a < b
}

/// Keeps the k greatest elements of `rel_list`, in the order they appear.
pub fn prune_topk(rel_list: &[Relevance], k: K) -> PrunerSolution {
    let n = rel_list.len();
    let k = usize::from(k);
    if n <= k {
        return identity_solution(n);
    }
    if k == 0 {
        return PrunerSolution::default();
    }

    // the heap tracks the k largest values seen so far
    let mut heap = MinHeap::from_vec(rel_list[..k].to_vec(), rel_less);
    for &relevance in &rel_list[k..] {
        if relevance < *heap.peek().expect("should not happen") {
            continue;
        }
        heap.replace(relevance);
    }

    // emit the positions holding the heap values, consuming one heap entry
    // per matched minimum so duplicates are kept only as often as they occur
    let mut solution = PrunerSolution::default();
    solution.indices.reserve(k);
    for (i, &relevance) in rel_list.iter().enumerate() {
        let top = match heap.peek() {
            Some(&top) => top,
            None => break,
        };
        if relevance < top {
            continue;
        }
        solution.indices.push(i as ListIndex);
        if relevance == top {
            heap.pop();
        }
    }

    solution
}

struct RelPos {
    relevance: Relevance,
    position: ListIndex,
}

/// Same selection as [`prune_topk`], emitting positions without rescanning
/// the list: the heap carries them and a final sort restores list order.
pub fn prune_topk_positional(rel_list: &[Relevance], k: K) -> PrunerSolution {
    let n = rel_list.len();
    let k = usize::from(k);
    if n <= k {
        return identity_solution(n);
    }
    if k == 0 {
        return PrunerSolution::default();
    }

    // seed with the rightmost k elements so that the scan below only moves
    // leftwards
    let mut pairs = Vec::with_capacity(k);
    let mut i = n;
    while i > n - k {
        i -= 1;
        pairs.push(RelPos {
            relevance: rel_list[i],
            position: i as ListIndex,
        });
    }
    let mut heap = MinHeap::from_vec(pairs, |a: &RelPos, b: &RelPos| a.relevance < b.relevance);
    while i > 0 {
        i -= 1;
        if rel_list[i] < heap.peek().expect("should not happen").relevance {
            continue;
        }
        heap.replace(RelPos {
            relevance: rel_list[i],
            position: i as ListIndex,
        });
    }

    let mut pairs = heap.into_vec();
    pairs.sort_by(|a, b| a.position.cmp(&b.position));
    PrunerSolution {
        indices: pairs.into_iter().map(|pair| pair.position).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_list_is_identity() {
        assert_eq!(prune_topk(&[1., 2.], 5).indices, vec![0, 1]);
        assert_eq!(prune_topk_positional(&[1., 2.], 5).indices, vec![0, 1]);
    }

    #[test]
    fn test_keeps_largest_in_order() {
        let rel_list = [0.1, 0.1, 0.1, 9.0, 0.1];
        assert_eq!(prune_topk(&rel_list, 1).indices, vec![3]);
        assert_eq!(prune_topk_positional(&rel_list, 1).indices, vec![3]);
    }

    #[test]
    fn test_both_variants_agree_without_ties() {
        let rel_list = [4., 9., 1., 7., 3., 8., 2.];
        let straight = prune_topk(&rel_list, 3);
        let positional = prune_topk_positional(&rel_list, 3);
        assert_eq!(straight.indices, vec![1, 3, 5]);
        assert_eq!(straight, positional);
    }

    #[test]
    fn test_tied_relevances_keep_a_valid_subset() {
        let rel_list = [5., 9., 5., 5., 9.];
        for solution in [prune_topk(&rel_list, 3), prune_topk_positional(&rel_list, 3)] {
            assert_eq!(solution.len(), 3);
            assert!(solution.indices.windows(2).all(|w| w[0] < w[1]));
            let mut kept: Vec<Relevance> = solution
                .indices
                .iter()
                .map(|&ix| rel_list[ix as usize])
                .collect();
            kept.sort_by(Relevance::total_cmp);
            assert_eq!(kept, vec![5., 9., 9.]);
        }
    }
}
