//! Exact Filtering@k
//!
//! A filter selects at most k elements of an attribute-sorted relevance list,
//! without reordering them, so that the position-discounted score of the
//! selection is maximal.

pub mod spirin;

use serde::{Deserialize, Serialize};

use crate::base::{ListIndex, Score};

/// Outcome of a filtering@k run: the achieved score and the selected
/// positions, strictly increasing in the input list.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct FilterSolution {
    pub score: Score,
    pub indices: Vec<ListIndex>,
}

impl FilterSolution {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
