//! Aggregation of filtering outcomes over many lists
//!
//! Averages are folded in incrementally with `1/(m+1)` and `m/(m+1)`
//! multipliers; this loses a little precision but cannot overflow however
//! many lists are assessed.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::base::{K, ListIndex, Result, Score};
use crate::composition::TestOutcome;

/// Running aggregation of the outcomes of one strategy over many lists.
#[derive(Serialize, Clone, Debug, Default)]
pub struct AggregationOutcome {
    pub avg_score: f64,
    pub max_approximation_error: f64,
    pub avg_approximation_error: f64,
    pub avg_num_elements_pruned: f64,
    pub avg_num_elements_not_pruned: f64,
    pub avg_first_stage_time: f64,
    pub avg_second_stage_time: f64,
    pub avg_total_time: f64,
}

impl AggregationOutcome {
    /// Folds in the outcome of one more list. `optimal_score` is the exact
    /// filtering score of the same list when the strategy is approximate,
    /// `None` for the exact strategy itself.
    pub fn update(
        &mut self,
        outcome: &TestOutcome,
        num_lists_previously_assessed: usize,
        optimal_score: Option<Score>,
    ) {
        let new_multiplier = 1. / (num_lists_previously_assessed as f64 + 1.);
        let old_multiplier = num_lists_previously_assessed as f64 * new_multiplier;

        let approximation_error = match optimal_score {
            Some(optimal) => 1. - f64::from(outcome.score) / f64::from(optimal),
            None => 0.,
        };
        if approximation_error > self.max_approximation_error {
            self.max_approximation_error = approximation_error;
        }

        self.avg_score = new_multiplier * f64::from(outcome.score) + old_multiplier * self.avg_score;
        self.avg_approximation_error =
            new_multiplier * approximation_error + old_multiplier * self.avg_approximation_error;
        self.avg_num_elements_pruned = new_multiplier * f64::from(outcome.num_elements_pruned)
            + old_multiplier * self.avg_num_elements_pruned;
        self.avg_num_elements_not_pruned = new_multiplier
            * f64::from(outcome.num_elements_not_pruned)
            + old_multiplier * self.avg_num_elements_not_pruned;
        self.avg_first_stage_time =
            new_multiplier * outcome.first_stage_time + old_multiplier * self.avg_first_stage_time;
        self.avg_second_stage_time = new_multiplier * outcome.second_stage_time
            + old_multiplier * self.avg_second_stage_time;
        self.avg_total_time =
            new_multiplier * outcome.total_time + old_multiplier * self.avg_total_time;
    }
}

/// One record of the final report: the aggregation of every strategy for one
/// `(n_cut, k)` combination. Strategy names keep their configuration order.
#[derive(Serialize, Clone, Debug)]
pub struct AssessmentRecord {
    pub n_cut: ListIndex,
    pub k: K,
    pub avg_reading_time: f64,
    pub num_lists_assessed: usize,
    pub strategies: Map<String, Value>,
}

impl AssessmentRecord {
    pub fn new(n_cut: ListIndex, k: K) -> Self {
        Self {
            n_cut,
            k,
            avg_reading_time: 0.,
            num_lists_assessed: 0,
            strategies: Map::new(),
        }
    }

    pub fn add_strategy(&mut self, name: &str, outcome: &AggregationOutcome) -> Result<()> {
        self.strategies
            .insert(name.to_string(), serde_json::to_value(outcome)?);
        Ok(())
    }
}

/// Writes the whole report as a JSON array.
pub fn write_report<W: std::io::Write>(writer: &mut W, records: &[AssessmentRecord]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, records)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(score: Score, total_time: f64) -> TestOutcome {
        TestOutcome {
            score,
            total_time,
            ..TestOutcome::default()
        }
    }

    #[test]
    fn test_running_average() {
        let mut aggregation = AggregationOutcome::default();
        aggregation.update(&outcome(2., 10.), 0, None);
        aggregation.update(&outcome(4., 20.), 1, None);
        assert!((aggregation.avg_score - 3.).abs() < 1e-9);
        assert!((aggregation.avg_total_time - 15.).abs() < 1e-9);
        assert_eq!(aggregation.max_approximation_error, 0.);
    }

    #[test]
    fn test_approximation_error() {
        let mut aggregation = AggregationOutcome::default();
        aggregation.update(&outcome(9., 0.), 0, Some(10.));
        assert!((aggregation.max_approximation_error - 0.1).abs() < 1e-6);
        aggregation.update(&outcome(10., 0.), 1, Some(10.));
        assert!((aggregation.max_approximation_error - 0.1).abs() < 1e-6);
        assert!((aggregation.avg_approximation_error - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_report_shape() {
        let mut record = AssessmentRecord::new(0, 50);
        record
            .add_strategy("OPT", &AggregationOutcome::default())
            .unwrap();
        let mut buffer = Vec::new();
        write_report(&mut buffer, &[record]).unwrap();
        let parsed: Value = serde_json::from_slice(&buffer).unwrap();
        assert!(parsed.is_array());
        assert!(parsed[0]["strategies"]["OPT"]["avg_score"].is_number());
        assert_eq!(parsed[0]["k"], 50);
    }
}
