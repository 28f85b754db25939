//! Rayon-backed batch scoring with per-item failure isolation.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ScoringResult;

/// An item that could not be scored, kept for the caller's diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub index: usize,
    pub item: String,
    pub error: String,
}

/// Scored items in input order plus the items that were skipped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome<R> {
    pub results: Vec<R>,
    pub failures: Vec<BatchFailure>,
}

impl<R> BatchOutcome<R> {
    pub fn scored(&self) -> usize {
        self.results.len()
    }

    pub fn skipped(&self) -> usize {
        self.failures.len()
    }
}

/// Score every item in parallel. A failing item is logged with its
/// identifier and left out of `results`; it never aborts the batch.
pub fn score_isolated<T, R, L, F>(items: &[T], label: L, score: F) -> BatchOutcome<R>
where
    T: Sync,
    R: Send,
    L: Fn(&T) -> &str + Sync,
    F: Fn(&T) -> ScoringResult<R> + Sync,
{
    let scored: Vec<ScoringResult<R>> = items.par_iter().map(&score).collect();

    let mut results = Vec::with_capacity(scored.len());
    let mut failures = Vec::new();
    for (index, (item, outcome)) in items.iter().zip(scored).enumerate() {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                let name = label(item);
                warn!("Skipping batch item {index} ({name:?}): {e}");
                failures.push(BatchFailure {
                    index,
                    item: name.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
    debug!(
        "Batch scored {} items, skipped {}",
        results.len(),
        failures.len()
    );
    BatchOutcome { results, failures }
}

/// Stable descending sort by `key`; ties keep their incoming order.
pub fn sort_descending_by<R, K>(results: &mut [R], key: K)
where
    K: Fn(&R) -> f64,
{
    results.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

/// Count occurrences of each label.
pub fn distribution<'a, I>(labels: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Clone the first `n` results of an already ordered slice.
pub fn top_n<R: Clone>(results: &[R], n: usize) -> Vec<R> {
    results.iter().take(n).cloned().collect()
}
