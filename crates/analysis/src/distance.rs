//! Approximate graph edit distance between two CFGs.
//!
//! The measure is deliberately cheap: the symmetric difference of the node
//! label multisets plus the absolute difference in edge counts. It is not a
//! true edit distance, but it is symmetric, zero on equal graphs, and fast
//! enough to sit inside the inner loop of the mutation search. Compare
//! simplified graphs; on raw graphs pure routing rewrites inflate the value.

use std::collections::HashMap;
use veil_core::Cfg;

/// Label-multiset/edge-count distance between two graphs.
pub fn edit_distance(a: &Cfg, b: &Cfg) -> usize {
    let mut counts: HashMap<&str, isize> = HashMap::new();
    for label in a.labels() {
        *counts.entry(label).or_default() += 1;
    }
    for label in b.labels() {
        *counts.entry(label).or_default() -= 1;
    }
    let label_diff: usize = counts.values().map(|c| c.unsigned_abs()).sum();

    let edge_diff = a.edge_count().abs_diff(b.edge_count());
    label_diff + edge_diff
}
