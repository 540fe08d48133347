//! Post-hoc validation of filtering solutions

use crate::base::{FilteringError, ListIndex, Relevance, Result, Score};
use crate::metric::SearchQualityMetric;

const CHECK_TOLERANCE: f64 = 1e-12;

/// Recomputes the score of a solution from its indices, accumulating in
/// selection order exactly as the filter does.
pub fn score_solution<M: SearchQualityMetric>(
    rel_list: &[Relevance],
    indices: &[ListIndex],
    metric: &M,
) -> Score {
    let mut score: Score = 0.;
    for (i, &ix) in indices.iter().enumerate() {
        score += metric.score(rel_list[ix as usize], i + 1);
    }
    score
}

/// Validates a solution: its indices must be strictly increasing, its claimed
/// score must match the recomputed one, and when the optimal score is known
/// the solution must land within the guaranteed approximation band
/// `[(1 - epsilon_below) * OPT, (1 + epsilon_above) * OPT]`.
pub fn check_solution<M: SearchQualityMetric>(
    rel_list: &[Relevance],
    solution_score: Score,
    indices: &[ListIndex],
    metric: &M,
    optimal_score: Option<Score>,
    epsilon_below: f64,
    epsilon_above: f64,
) -> Result<()> {
    if !indices.windows(2).all(|w| w[0] < w[1]) {
        return Err(FilteringError::CheckFailure(
            "the solution indices are not strictly increasing".into(),
        ));
    }
    if let Some(&last) = indices.last() {
        if last as usize >= rel_list.len() {
            return Err(FilteringError::CheckFailure(
                "the solution indices fall outside the list".into(),
            ));
        }
    }

    let real_score = f64::from(score_solution(rel_list, indices, metric));
    let claimed = f64::from(solution_score);
    if (claimed - real_score).abs() > CHECK_TOLERANCE {
        return Err(FilteringError::CheckFailure(
            "the solution score differs from the score recomputed from its indices".into(),
        ));
    }

    if let Some(optimal_score) = optimal_score {
        let optimal_score = f64::from(optimal_score);
        if real_score + CHECK_TOLERANCE < (1. - epsilon_below) * optimal_score {
            return Err(FilteringError::CheckFailure(
                "the solution score is less than (1-eps) times the optimal one".into(),
            ));
        }
        if real_score - CHECK_TOLERANCE > (1. + epsilon_above) * optimal_score {
            return Err(FilteringError::CheckFailure(
                "the solution score is greater than (1+eps) times the optimal one".into(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::spirin::FilterSpirin;
    use crate::metric::{Dcg, SearchQualityMetric};

    #[test]
    fn test_accepts_exact_solution() {
        let metric = Dcg::with_max_position(2);
        let rel_list = [1., 3., 0.5, 2.];
        let solution = FilterSpirin::new(2, &metric).filter(&rel_list);
        check_solution(
            &rel_list,
            solution.score,
            &solution.indices,
            &metric,
            Some(solution.score),
            0.,
            0.,
        )
        .unwrap();
    }

    #[test]
    fn test_rejects_corrupted_score() {
        let metric = Dcg::with_max_position(2);
        let rel_list = [1., 3., 0.5, 2.];
        let solution = FilterSpirin::new(2, &metric).filter(&rel_list);
        let status = check_solution(
            &rel_list,
            solution.score + 0.5,
            &solution.indices,
            &metric,
            None,
            0.,
            0.,
        );
        assert!(status.is_err());
    }

    #[test]
    fn test_rejects_score_below_the_guarantee() {
        let metric = Dcg::with_max_position(2);
        let rel_list = [1., 3., 0.5, 2.];
        let weak = [2u32];
        let weak_score = score_solution(&rel_list, &weak, &metric);
        let optimal = FilterSpirin::new(2, &metric).filter(&rel_list).score;
        let status = check_solution(&rel_list, weak_score, &weak, &metric, Some(optimal), 0.1, 0.);
        assert!(status.is_err());
    }

    #[test]
    fn test_rejects_unordered_indices() {
        let metric = Dcg::with_max_position(2);
        let rel_list = [1., 3., 0.5, 2.];
        let status = check_solution(&rel_list, 0., &[2, 1], &metric, None, 0., 0.);
        assert!(status.is_err());
    }
}
