/*!
Multi-resolution reduction: three stages of key coarsening, each a
component-wise sum of [PeerCounters].

All merges are associative and commutative, so rows may arrive in any order
and any grouping -- per-unit outputs, retried schedules, or partial merges
from a distributed executor all reduce to the same maps.
*/
use crate::models::{PeerCounters, PeerSignature};
use std::collections::HashMap;

/// Key of a raw per-unit result row.
pub type PeerKey = (u64, String, PeerSignature);
/// One raw result row.
pub type PeerRow = (PeerKey, PeerCounters);

pub type PerPeer = HashMap<PeerKey, PeerCounters>;
pub type PerCollector = HashMap<(u64, String), PeerCounters>;
pub type PerTime = HashMap<u64, PeerCounters>;

/// Stage A: merge raw rows by (bucket, collector, peer).
pub fn reduce_by_peer(rows: impl IntoIterator<Item = PeerRow>) -> PerPeer {
    let mut out = PerPeer::new();
    for (key, counters) in rows {
        *out.entry(key).or_default() += counters;
    }
    out
}

/// Stage B: project away the peer component and re-reduce.
///
/// The full counter triple is carried through; report emission picks the
/// fields meaningful at this level (elem_count and collector_record_count --
/// peer_record_count aggregated across peers has no interpretation).
pub fn reduce_by_collector(per_peer: &PerPeer) -> PerCollector {
    let mut out = PerCollector::new();
    for ((bucket, collector, _peer), counters) in per_peer {
        *out.entry((*bucket, collector.clone())).or_default() += *counters;
    }
    out
}

/// Stage C: project away the collector component and re-reduce.
pub fn reduce_by_time(per_collector: &PerCollector) -> PerTime {
    let mut out = PerTime::new();
    for ((bucket, _collector), counters) in per_collector {
        *out.entry(*bucket).or_default() += *counters;
    }
    out
}
