//! Reading of result lists from tab-separated input
//!
//! One row per result: `id<TAB>attribute<TAB>relevance`. Rows with a
//! non-positive relevance cannot contribute gain and are dropped on the
//! spot. In file mode a list spans the whole input; in stream mode several
//! lists share one stream, each prefixed by its row count (and the stream by
//! the number of lists).

use std::cmp::Ordering;
use std::io::BufRead;

use log::debug;

use crate::base::{FilteringError, Relevance, Result};

/// A result list as read from the input: parallel columns of ids,
/// attribute values and relevances, ordered by attribute ascending.
pub struct ResultsList {
    pub ids: Vec<String>,
    pub attributes: Vec<f64>,
    pub relevances: Vec<Relevance>,
}

impl ResultsList {
    pub fn len(&self) -> usize {
        self.relevances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relevances.is_empty()
    }
}

/// Reads one line holding a single count (number of lists, or number of rows
/// of the next list in stream mode).
pub fn read_count_line<R: BufRead>(reader: &mut R, what: &str) -> Result<usize> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(FilteringError::InvalidInput(format!(
            "the input stream is not properly formatted: unable to extract the number of {}",
            what
        )));
    }
    line.trim().parse().map_err(|_| {
        FilteringError::InvalidInput(format!(
            "the input stream is not properly formatted: unable to extract the number of {}",
            what
        ))
    })
}

/// Reads a result list. `num_rows` is `None` in file mode (read until the
/// input ends) and `Some(n)` in stream mode (read exactly n rows, leaving the
/// rest of the stream untouched). If the attribute values turn out not to be
/// sorted, the list is reordered by attribute ascending.
pub fn read_results_list<R: BufRead>(
    reader: &mut R,
    num_rows: Option<usize>,
) -> Result<ResultsList> {
    let mut ids = Vec::new();
    let mut attributes = Vec::new();
    let mut relevances = Vec::new();
    if let Some(n) = num_rows {
        ids.reserve(n);
        attributes.reserve(n);
        relevances.reserve(n);
    }

    let mut last_attribute = f64::NEG_INFINITY;
    let mut is_sorted = true;
    let mut line = String::new();
    let mut row = 0;
    loop {
        if num_rows == Some(row) {
            break;
        }
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            match num_rows {
                None => break,
                Some(n) => {
                    return Err(FilteringError::InvalidInput(format!(
                        "the input stream is not properly formatted: expected {} rows, the input ended after {}",
                        n, row
                    )));
                }
            }
        }
        let record = line.trim_end_matches(['\n', '\r']);
        if record.is_empty() && num_rows.is_none() {
            // a trailing blank line ends a file-mode list
            continue;
        }

        let mut fields = record.split('\t');
        let id = fields.next().unwrap_or_default();
        let attribute = fields.next().ok_or_else(|| {
            FilteringError::InvalidInput(
                "the input stream is not properly formatted: a tab character is missing after the id"
                    .into(),
            )
        })?;
        let relevance = fields.next().ok_or_else(|| {
            FilteringError::InvalidInput(
                "the input stream is not properly formatted: a tab character is missing after the attribute"
                    .into(),
            )
        })?;
        if fields.next().is_some() {
            return Err(FilteringError::InvalidInput(
                "the input stream is not properly formatted: a new line is missing after the relevance"
                    .into(),
            ));
        }
        let attribute: f64 = attribute.trim().parse().map_err(|_| {
            FilteringError::InvalidInput(
                "the input stream is not properly formatted: unable to extract the attribute value"
                    .into(),
            )
        })?;
        let relevance: Relevance = relevance.trim().parse().map_err(|_| {
            FilteringError::InvalidInput(
                "the input stream is not properly formatted: unable to extract the relevance value"
                    .into(),
            )
        })?;
        row += 1;

        if attribute < last_attribute {
            is_sorted = false;
        }
        last_attribute = attribute;

        if relevance > 0. {
            ids.push(id.to_string());
            attributes.push(attribute);
            relevances.push(relevance);
        }
    }

    if !is_sorted {
        debug!("input list is not sorted by attribute, reordering");
        let mut permutation: Vec<usize> = (0..attributes.len()).collect();
        permutation.sort_unstable_by(|&a, &b| {
            attributes[a]
                .partial_cmp(&attributes[b])
                .unwrap_or(Ordering::Equal)
        });
        let mut sorted_ids = Vec::with_capacity(ids.len());
        let mut sorted_attributes = Vec::with_capacity(attributes.len());
        let mut sorted_relevances = Vec::with_capacity(relevances.len());
        for &i in &permutation {
            sorted_ids.push(std::mem::take(&mut ids[i]));
            sorted_attributes.push(attributes[i]);
            sorted_relevances.push(relevances[i]);
        }
        ids = sorted_ids;
        attributes = sorted_attributes;
        relevances = sorted_relevances;
    }

    Ok(ResultsList {
        ids,
        attributes,
        relevances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_file_mode() {
        let mut input = Cursor::new("a\t1.0\t0.5\nb\t2.0\t3.0\n");
        let list = read_results_list(&mut input, None).unwrap();
        assert_eq!(list.ids, vec!["a", "b"]);
        assert_eq!(list.attributes, vec![1.0, 2.0]);
        assert_eq!(list.relevances, vec![0.5, 3.0]);
    }

    #[test]
    fn test_skips_non_positive_relevances() {
        let mut input = Cursor::new("a\t1.0\t0.0\nb\t2.0\t3.0\nc\t3.0\t-1.0\n");
        let list = read_results_list(&mut input, None).unwrap();
        assert_eq!(list.ids, vec!["b"]);
    }

    #[test]
    fn test_reorders_by_attribute() {
        let mut input = Cursor::new("a\t3.0\t1.0\nb\t1.0\t2.0\nc\t2.0\t3.0\n");
        let list = read_results_list(&mut input, None).unwrap();
        assert_eq!(list.ids, vec!["b", "c", "a"]);
        assert_eq!(list.attributes, vec![1.0, 2.0, 3.0]);
        assert_eq!(list.relevances, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_stream_mode_leaves_the_rest() {
        let mut input = Cursor::new("2\na\t1.0\t1.0\nb\t2.0\t2.0\nc\t3.0\t3.0\n");
        let n = read_count_line(&mut input, "rows").unwrap();
        assert_eq!(n, 2);
        let list = read_results_list(&mut input, Some(n)).unwrap();
        assert_eq!(list.ids, vec!["a", "b"]);
        let mut rest = String::new();
        input.read_line(&mut rest).unwrap();
        assert_eq!(rest, "c\t3.0\t3.0\n");
    }

    #[test]
    fn test_stream_mode_truncated_input() {
        let mut input = Cursor::new("a\t1.0\t1.0\n");
        assert!(read_results_list(&mut input, Some(2)).is_err());
    }

    #[test]
    fn test_missing_tab() {
        let mut input = Cursor::new("a 1.0 0.5\n");
        assert!(read_results_list(&mut input, None).is_err());
    }

    #[test]
    fn test_unparsable_relevance() {
        let mut input = Cursor::new("a\t1.0\thigh\n");
        assert!(read_results_list(&mut input, None).is_err());
    }
}
