//! Search quality metrics of the DCG family
//!
//! A metric scores one selected element as `gain(relevance) * discount(position)`
//! (positions are 1-based). Discounts are precomputed up to the maximum
//! position a filter can select, so the dynamic program pays one table lookup
//! per cell.

use crate::base::{Relevance, Score};

pub trait SearchQualityMetric: Sync {
    /// Builds the metric with discount tables covering positions
    /// `0..=max_position`. One instance per (metric, largest k) pair is
    /// enough; it is immutable afterwards and can be shared.
    fn with_max_position(max_position: usize) -> Self
    where
        Self: Sized;

    fn gain(&self, relevance: Relevance) -> Score;

    /// Inverse of [`gain`](Self::gain). The epsilon pruner uses it to map
    /// gain interval boundaries back to relevance space; floating point can
    /// make `gain(gain_inverse(x))` land slightly above `x`.
    fn gain_inverse(&self, gain: Score) -> Relevance;

    /// Discount of a 1-based position. `discount(0)` is 0 and the discount is
    /// strictly decreasing from position 1 on.
    fn discount(&self, position: usize) -> Score;

    /// Sum of the discounts of positions `left..=right`, via the prefix
    /// table. `right == left - 1` yields 0 (empty range).
    fn discount_sum(&self, left: usize, right: usize) -> Score;

    fn max_position(&self) -> usize;

    /// Contribution of one element at a 1-based position.
    #[inline]
    fn score(&self, relevance: Relevance, position: usize) -> Score {
        self.gain(relevance) * self.discount(position)
    }
}

fn discount_prefix_sums(discounts: &[Score]) -> Vec<Score> {
    let mut sums = vec![0.; discounts.len()];
    for i in 1..discounts.len() {
        sums[i] = sums[i - 1] + discounts[i];
    }
    sums
}

/// Discounted Cumulative Gain: `gain(r) = 2^r - 1`, `discount(p) = 1/log2(p+1)`.
pub struct Dcg {
    discounts: Vec<Score>,
    discount_sums: Vec<Score>,
}

impl SearchQualityMetric for Dcg {
    fn with_max_position(max_position: usize) -> Self {
        let mut discounts = vec![0.; max_position + 1];
        for (i, discount) in discounts.iter_mut().enumerate().skip(1) {
            *discount = 1. / ((i as Score) + 1.).log2();
        }
        let discount_sums = discount_prefix_sums(&discounts);
        Self {
            discounts,
            discount_sums,
        }
    }

    #[inline]
    fn gain(&self, relevance: Relevance) -> Score {
        (2. as Score).powf(relevance) - 1.
    }

    #[inline]
    fn gain_inverse(&self, gain: Score) -> Relevance {
        (gain + 1.).log2()
    }

    #[inline]
    fn discount(&self, position: usize) -> Score {
        self.discounts[position]
    }

    #[inline]
    fn discount_sum(&self, left: usize, right: usize) -> Score {
        debug_assert!(left >= 1 && left <= right + 1);
        self.discount_sums[right] - self.discount_sums[left - 1]
    }

    fn max_position(&self) -> usize {
        self.discounts.len() - 1
    }
}

/// Linear-gain DCG variant: `gain(r) = r`, `discount(p) = 1/p`.
pub struct DcgLz {
    discounts: Vec<Score>,
    discount_sums: Vec<Score>,
}

impl SearchQualityMetric for DcgLz {
    fn with_max_position(max_position: usize) -> Self {
        let mut discounts = vec![0.; max_position + 1];
        for (i, discount) in discounts.iter_mut().enumerate().skip(1) {
            *discount = 1. / (i as Score);
        }
        let discount_sums = discount_prefix_sums(&discounts);
        Self {
            discounts,
            discount_sums,
        }
    }

    #[inline]
    fn gain(&self, relevance: Relevance) -> Score {
        relevance
    }

    #[inline]
    fn gain_inverse(&self, gain: Score) -> Relevance {
        gain
    }

    #[inline]
    fn discount(&self, position: usize) -> Score {
        self.discounts[position]
    }

    #[inline]
    fn discount_sum(&self, left: usize, right: usize) -> Score {
        debug_assert!(left >= 1 && left <= right + 1);
        self.discount_sums[right] - self.discount_sums[left - 1]
    }

    fn max_position(&self) -> usize {
        self.discounts.len() - 1
    }
}
