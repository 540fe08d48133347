//! Filtering@k of result lists sorted by an attribute value
//!
//! Given a list of results already ordered by some attribute (price,
//! distance, time) together with a relevance estimate per result, the crate
//! selects at most k of them, preserving the attribute order, so that a
//! position-discounted search quality metric is maximized. The exact
//! dynamic-programming filter can be preceded by a pruning stage that shrinks
//! the list first; the top-k pruners keep half of the optimal score, the
//! epsilon pruner a `1 - epsilon` fraction of it.

pub mod assessment;
pub mod base;
pub mod check;
pub mod composition;
pub mod filter;
pub mod heapq;
pub mod metric;
pub mod pruner;
pub mod reader;
