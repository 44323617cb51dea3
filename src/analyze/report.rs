/*!
Report emission: deterministic columnar rows at three aggregation levels.

Row order within a level is driven by map iteration and is not guaranteed.
*/
use crate::analyze::reduce::{PerCollector, PerPeer, PerTime};
use crate::models::RecordType;
use chrono::DateTime;
use std::io;
use std::io::Write;

pub const CSV_HEADER: &str = "Time,Collector,Peer,#Elems,#Records";

/// UTC date (YYYY-MM-DD) for a report file name.
fn date_str(ts: u64) -> String {
    match DateTime::from_timestamp(ts as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => ts.to_string(),
    }
}

/// `bgpstream-recordcounter.<type>.<start-date>-<end-date>.csv`
pub fn report_file_name(record_type: RecordType, start: u64, end: u64) -> String {
    format!(
        "bgpstream-recordcounter.{}.{}-{}.csv",
        record_type,
        date_str(start),
        date_str(end)
    )
}

pub fn write_report<W: Write>(
    mut w: W,
    per_peer: &PerPeer,
    per_collector: &PerCollector,
    per_time: &PerTime,
) -> io::Result<()> {
    writeln!(w, "{}", CSV_HEADER)?;

    // per-peer statistics: elem and per-peer record counts
    for ((ts, collector, peer), counters) in per_peer {
        writeln!(
            w,
            "{},{},{},{},{}",
            ts,
            collector,
            peer.label(),
            counters.elem_count,
            counters.peer_record_count
        )?;
    }

    // per-collector statistics: the record count comes from the separately
    // tracked collector_record_count so multi-peer records count once
    for ((ts, collector), counters) in per_collector {
        writeln!(
            w,
            "{},{},ALL-PEERS,{},{}",
            ts, collector, counters.elem_count, counters.collector_record_count
        )?;
    }

    // global statistics
    for (ts, counters) in per_time {
        writeln!(
            w,
            "{},ALL-COLLECTORS,ALL-PEERS,{},{}",
            ts, counters.elem_count, counters.collector_record_count
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::reduce::{reduce_by_collector, reduce_by_peer, reduce_by_time};
    use crate::models::{Asn, PeerCounters, PeerSignature};

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(RecordType::Updates, 1427846400, 1427932800),
            "bgpstream-recordcounter.updates.2015-04-01-2015-04-02.csv"
        );
    }

    #[test]
    fn test_write_report_rows() {
        let sig = PeerSignature {
            project: "ris".to_string(),
            collector: "rrc06".to_string(),
            peer_asn: Asn(25152),
            peer_address: "202.249.2.185".parse().unwrap(),
        };
        let per_peer = reduce_by_peer(vec![(
            (1427846400, "rrc06".to_string(), sig),
            PeerCounters::new(12, 3, 3),
        )]);
        let per_collector = reduce_by_collector(&per_peer);
        let per_time = reduce_by_time(&per_collector);

        let mut buf = Vec::new();
        write_report(&mut buf, &per_peer, &per_collector, &per_time).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines.contains(&"1427846400,rrc06,AS25152-202.249.2.185,12,3"));
        assert!(lines.contains(&"1427846400,rrc06,ALL-PEERS,12,3"));
        assert!(lines.contains(&"1427846400,ALL-COLLECTORS,ALL-PEERS,12,3"));
        assert_eq!(lines.len(), 4);
    }
}
