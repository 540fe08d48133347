//! Lossless Filtering@k, the dynamic program of Spirin et al.
//!
//! Cell `[row, col]` of the program holds the best score achievable by
//! selecting exactly `col + 1` elements among `rel_list[0..=row]` with the
//! element at `row` selected last. The first k rows are triangular (row `r`
//! has `r + 1` reachable cells), the remaining ones rectangular with k cells,
//! and the whole matrix lives in one flat vector addressed through two
//! running row offsets.

use log::debug;

use crate::base::{K, ListIndex, Relevance, Score};
use crate::filter::FilterSolution;
use crate::metric::SearchQualityMetric;

pub struct FilterSpirin<'a, M> {
    k: K,
    metric: &'a M,
}

impl<'a, M: SearchQualityMetric> FilterSpirin<'a, M> {
    pub fn new(k: K, metric: &'a M) -> Self {
        Self { k, metric }
    }

    pub fn k(&self) -> K {
        self.k
    }

    /// Filters the given attribute-ordered relevance list and returns an
    /// optimal filtering@k solution.
    pub fn filter(&self, rel_list: &[Relevance]) -> FilterSolution {
        let n = rel_list.len();
        let mut solution = FilterSolution::default();
        if n == 0 || self.k == 0 {
            return solution;
        }
        let k = usize::from(self.k).min(n);

        // gains of every element and discounts of the first k positions,
        // resolved once so the cell loops below stay table-free
        let gains: Vec<Score> = rel_list.iter().map(|&r| self.metric.gain(r)).collect();
        let discounts: Vec<Score> = (0..k).map(|i| self.metric.discount(i + 1)).collect();

        // triangular block plus rectangular block, written strictly in cell
        // order so every read below hits an already-written cell
        let mut m: Vec<Score> = Vec::with_capacity(k * (k + 1) / 2 + k * (n - k));
        let mut prev_row_shift = 0;
        let mut curr_row_shift = 0;

        m.push(gains[0] * discounts[0]);
        for row in 1..k {
            curr_row_shift = prev_row_shift + row;

            m.push(m[prev_row_shift].max(gains[row] * discounts[0]));
            for col in 1..row {
                m.push(
                    m[prev_row_shift + col]
                        .max(m[prev_row_shift + col - 1] + gains[row] * discounts[col]),
                );
            }
            // the diagonal cell has no "skip this row" predecessor
            m.push(m[prev_row_shift + row - 1] + gains[row] * discounts[row]);

            prev_row_shift = curr_row_shift;
        }
        for row in k..n {
            curr_row_shift = prev_row_shift + k;

            m.push(m[prev_row_shift].max(gains[row] * discounts[0]));
            for col in 1..k {
                m.push(
                    m[prev_row_shift + col]
                        .max(m[prev_row_shift + col - 1] + gains[row] * discounts[col]),
                );
            }

            prev_row_shift = curr_row_shift;
        }

        // best score within the last row; the strict comparison keeps the
        // smallest column on ties, hence the shortest optimal subset
        solution.indices.reserve(k);
        let mut best_column = 0;
        for col in 0..k {
            if m[curr_row_shift + col] > solution.score {
                solution.score = m[curr_row_shift + col];
                best_column = col;
            }
        }

        // trace back: a cell improving on the one above it means the row
        // element participates in the solution
        for row in (1..n).rev() {
            prev_row_shift = curr_row_shift - row.min(k);
            if m[curr_row_shift + best_column] > m[prev_row_shift + best_column] {
                solution.indices.push(row as ListIndex);
                if best_column == 0 {
                    break;
                }
                best_column -= 1;
            }
            curr_row_shift = prev_row_shift;
        }
        if curr_row_shift == 0 {
            solution.indices.push(0);
        }

        // indices were collected from right to left
        solution.indices.reverse();
        debug!(
            "filter@{} over {} elements: score {}, {} selected",
            k,
            n,
            solution.score,
            solution.indices.len()
        );

        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{Dcg, DcgLz};
    use ntest::assert_about_eq;

    #[test]
    fn test_empty_list() {
        let metric = Dcg::with_max_position(2);
        let solution = FilterSpirin::new(2, &metric).filter(&[]);
        assert_eq!(solution.score, 0.);
        assert!(solution.is_empty());
    }

    #[test]
    fn test_single_best_element() {
        // ties on the best score resolve to the earliest position
        let metric = Dcg::with_max_position(1);
        let solution = FilterSpirin::new(1, &metric).filter(&[3., 0., 0., 3.]);
        assert_eq!(solution.indices, vec![0]);
        assert_about_eq!(solution.score, 7., 1e-6);
    }

    #[test]
    fn test_increasing_list() {
        let metric = DcgLz::with_max_position(3);
        let solution = FilterSpirin::new(3, &metric).filter(&[1., 2., 3., 4., 5.]);
        assert_eq!(solution.indices, vec![2, 3, 4]);
        assert_about_eq!(solution.score, 3. + 4. * 0.5 + 5. / 3., 1e-5);
    }

    #[test]
    fn test_decreasing_list() {
        let metric = DcgLz::with_max_position(3);
        let solution = FilterSpirin::new(3, &metric).filter(&[5., 4., 3., 2., 1.]);
        assert_eq!(solution.indices, vec![0, 1, 2]);
        assert_about_eq!(solution.score, 5. + 2. + 1., 1e-5);
    }

    #[test]
    fn test_all_zero_relevances() {
        let metric = Dcg::with_max_position(2);
        let solution = FilterSpirin::new(2, &metric).filter(&[0., 0., 0., 0.]);
        assert_eq!(solution.score, 0.);
    }

    #[test]
    fn test_k_larger_than_list() {
        let metric = DcgLz::with_max_position(10);
        let solution = FilterSpirin::new(10, &metric).filter(&[2., 1.]);
        assert_eq!(solution.indices, vec![0, 1]);
        assert_about_eq!(solution.score, 2. + 0.5, 1e-6);
    }
}
