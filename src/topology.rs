/*!
AS-level topology aggregation: fold the AS paths of routing elements into a
set of undirected AS adjacencies.
*/
use crate::models::{Asn, StreamElem};
use std::collections::HashSet;

/// An undirected AS adjacency set built from observed AS paths.
///
/// Adjacency pairs are stored sorted so the two directions of a link
/// collapse into one entry; prepend runs on a path never produce a
/// self-adjacency.
#[derive(Debug, Default)]
pub struct AsTopology {
    adjacencies: HashSet<(Asn, Asn)>,
    elem_count: u64,
}

impl AsTopology {
    pub fn new() -> Self {
        AsTopology::default()
    }

    /// Feeds one element into the topology. Elements without an AS path
    /// (withdrawals, state messages) still count as processed.
    pub fn add_elem(&mut self, elem: &StreamElem) {
        self.elem_count += 1;
        if let Some(path) = elem.as_path() {
            for (a, b) in path.adjacencies() {
                self.adjacencies.insert((a.min(b), a.max(b)));
            }
        }
    }

    /// Number of distinct AS adjacencies seen.
    pub fn adjacency_count(&self) -> usize {
        self.adjacencies.len()
    }

    /// Number of elements processed.
    pub fn elem_count(&self) -> u64 {
        self.elem_count
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Asn, Asn)> {
        self.adjacencies.iter()
    }
}
