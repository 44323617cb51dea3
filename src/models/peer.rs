use crate::models::{Asn, StreamElem, StreamRecord};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::ops::{Add, AddAssign};

/// Globally unique identifier of a BGP peering session within a collector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerSignature {
    pub project: String,
    pub collector: String,
    pub peer_asn: Asn,
    pub peer_address: IpAddr,
}

impl PeerSignature {
    pub fn new(record: &StreamRecord, elem: &StreamElem) -> Self {
        PeerSignature {
            project: record.project.clone(),
            collector: record.collector.clone(),
            peer_asn: elem.peer_asn,
            peer_address: elem.peer_address,
        }
    }

    /// The peer column label used in report rows.
    pub fn label(&self) -> String {
        format!("AS{}-{}", self.peer_asn, self.peer_address)
    }
}

impl Display for PeerSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.project,
            self.collector,
            self.label()
        )
    }
}

/// Counters accumulated for one peer signature.
///
/// `collector_record_count` is tracked separately from `peer_record_count`:
/// a record with elements for many peers bumps `peer_record_count` for each
/// of them but `collector_record_count` for exactly one, so collector totals
/// never overcount records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerCounters {
    pub elem_count: u64,
    pub peer_record_count: u64,
    pub collector_record_count: u64,
}

impl PeerCounters {
    pub fn new(elem_count: u64, peer_record_count: u64, collector_record_count: u64) -> Self {
        PeerCounters {
            elem_count,
            peer_record_count,
            collector_record_count,
        }
    }
}

impl AddAssign for PeerCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.elem_count += rhs.elem_count;
        self.peer_record_count += rhs.peer_record_count;
        self.collector_record_count += rhs.collector_record_count;
    }
}

impl Add for PeerCounters {
    type Output = PeerCounters;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}
