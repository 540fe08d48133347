pub type Relevance = f32;
pub type Score = f32;
pub type ListIndex = u32;
pub type K = u16;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum and maximum relevance of a list, computed once by the caller and
/// shared by every pruning stage run on that list.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct MinMax {
    pub min: Relevance,
    pub max: Relevance,
}

impl MinMax {
    /// Single pass over the list; the first element seeds both bounds.
    /// Panics on an empty list, which drivers are expected to skip.
    pub fn of(rel_list: &[Relevance]) -> Self {
        let mut minmax = Self {
            min: rel_list[0],
            max: rel_list[0],
        };
        for &relevance in &rel_list[1..] {
            if relevance < minmax.min {
                minmax.min = relevance;
            } else if relevance > minmax.max {
                minmax.max = relevance;
            }
        }
        minmax
    }
}

#[derive(Error, Debug)]
pub enum FilteringError {
    /// A parameter or input record the drivers cannot work with.
    #[error("{0}")]
    InvalidInput(String),

    /// A solution failed the post-hoc validation of its score.
    #[error("AssertionError: {0}")]
    CheckFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = FilteringError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minmax() {
        let minmax = MinMax::of(&[3., 0.5, 7., 1.]);
        assert_eq!(minmax.min, 0.5);
        assert_eq!(minmax.max, 7.);
    }

    #[test]
    fn test_minmax_single() {
        let minmax = MinMax::of(&[2.]);
        assert_eq!(minmax.min, 2.);
        assert_eq!(minmax.max, 2.);
    }
}
