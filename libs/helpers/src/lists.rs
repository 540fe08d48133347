//! Random relevance lists for tests and benches

use std::io::Write;

use rand::distributions::Uniform;
use rand::RngCore;
use rand_distr::{Distribution, LogNormal};

use attr_filtering::base::Relevance;

/// Creates a relevance list of positive log-normal values, the typical shape
/// of model-estimated relevances.
pub fn create_relevance_list(n: usize, rng: &mut dyn RngCore) -> Vec<Relevance> {
    let log_normal = LogNormal::new(0., 1.).expect("valid distribution parameters");
    (0..n).map(|_| log_normal.sample(rng) as Relevance).collect()
}

/// Creates a relevance list of integer grades in `0..=max_grade`, the shape
/// editorial judgments come in.
pub fn create_graded_relevance_list(
    n: usize,
    max_grade: u32,
    rng: &mut dyn RngCore,
) -> Vec<Relevance> {
    let grades = Uniform::new_inclusive(0, max_grade);
    (0..n).map(|_| grades.sample(rng) as Relevance).collect()
}

/// Writes a list as tab-separated result rows with ascending attribute
/// values, the format the readers consume in file mode.
pub fn write_results_rows<W: Write>(
    writer: &mut W,
    relevances: &[Relevance],
) -> std::io::Result<()> {
    for (i, relevance) in relevances.iter().enumerate() {
        writeln!(writer, "doc{}\t{}.0\t{}", i, i, relevance)?;
    }
    Ok(())
}
