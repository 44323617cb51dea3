/*!
The aggregation pipeline: units of work, per-unit stream consumption, and
the driver that runs units through the worker pool and reduces their rows.

Each unit of work is a pure function from (collector, interval, record type)
to a list of result rows. Units share no state; any parallel map-reduce
executor may run them in any order.
*/
pub mod reduce;
pub mod report;

use crate::analyze::reduce::{
    reduce_by_collector, reduce_by_peer, reduce_by_time, PeerRow, PerCollector, PerPeer, PerTime,
};
use crate::analyze::report::{report_file_name, write_report};
use crate::error::StreamError;
use crate::models::{PeerCounters, PeerSignature, RecordType};
use crate::pool;
use crate::stream::source::RecordSource;
use crate::stream::BgpStream;
use crate::timeslice::{
    ceil_to, floor_to, partition_time, processing_granularity, RESULT_GRANULARITY,
};
use log::{debug, info};
use std::collections::HashMap;
use std::io;
use std::io::Write;

/// One (collector, time slice, record type) unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitOfWork {
    pub collector: String,
    /// Half-open slice start, seconds.
    pub start: u64,
    /// Half-open slice end, seconds.
    pub end: u64,
    pub record_type: RecordType,
}

/// Aggregation run configuration.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Requested start time; rounded down to the nearest day.
    pub start: u64,
    /// Requested end time; rounded up to the nearest day.
    pub end: u64,
    pub record_type: RecordType,
    pub collectors: Vec<String>,
    pub workers: usize,
}

/// The reduced output of one analysis run.
#[derive(Debug)]
pub struct Analysis {
    /// Rounded run start.
    pub start: u64,
    /// Rounded run end.
    pub end: u64,
    pub record_type: RecordType,
    pub per_peer: PerPeer,
    pub per_collector: PerCollector,
    pub per_time: PerTime,
}

impl Analysis {
    pub fn file_name(&self) -> String {
        report_file_name(self.record_type, self.start, self.end)
    }

    pub fn write_csv<W: Write>(&self, w: W) -> io::Result<()> {
        write_report(w, &self.per_peer, &self.per_collector, &self.per_time)
    }
}

/// Builds the per-collector, per-processing-slice units for a run.
///
/// The run interval is first rounded outward to whole output buckets (start
/// down, end up), split into day slices, and each day slice is chunked by
/// the collector's processing granularity.
pub fn build_units(
    start: u64,
    end: u64,
    record_type: RecordType,
    collectors: &[String],
) -> (u64, u64, Vec<UnitOfWork>) {
    let start = floor_to(start, RESULT_GRANULARITY);
    let end = ceil_to(end, RESULT_GRANULARITY);

    let mut units = vec![];
    for (day_start, day_end) in partition_time(start, end, RESULT_GRANULARITY) {
        for collector in collectors {
            let duration = processing_granularity(record_type, collector);
            let mut slice_start = day_start;
            while slice_start < day_end {
                let slice_end = (slice_start + duration).min(day_end);
                units.push(UnitOfWork {
                    collector: collector.clone(),
                    start: slice_start,
                    end: slice_end,
                    record_type,
                });
                slice_start += duration;
            }
        }
    }
    (start, end, units)
}

/// Runs one unit of work against an opened source.
///
/// Opens and filters a stream for exactly this unit's collector, interval
/// and record type, then folds its records into per-peer counters. Exact
/// per unit; merging across units is Stage A's job.
pub fn run_unit<S: RecordSource>(
    source: S,
    unit: &UnitOfWork,
) -> Result<Vec<PeerRow>, StreamError> {
    // the stream interval is inclusive on both ends; the unit is half-open
    let mut stream = BgpStream::new(source)
        .add_filter("collector", &unit.collector)?
        .add_filter("record-type", &unit.record_type.to_string())?
        .add_interval_filter(unit.start, unit.end.saturating_sub(1))
        .start()?;

    let mut peers: HashMap<PeerSignature, PeerCounters> = HashMap::new();
    let mut record_count: u64 = 0;

    while let Some(record) = stream.next_record()? {
        record_count += 1;

        // distinct peer signatures touched by this record, with the number
        // of elements each contributed
        let mut touched: HashMap<PeerSignature, u64> = HashMap::new();
        for elem in &record.elems {
            *touched.entry(PeerSignature::new(&record, elem)).or_default() += 1;
        }

        // exactly one peer (unspecified which) absorbs the record into
        // collector_record_count, so a record spanning many peers still
        // counts once at the collector level
        let mut absorbed = false;
        for (sig, elem_count) in touched {
            let counters = peers.entry(sig).or_default();
            counters.elem_count += elem_count;
            counters.peer_record_count += 1;
            if !absorbed {
                counters.collector_record_count += 1;
                absorbed = true;
            }
        }
    }

    debug!(
        "unit {}/{} [{}, {}): {} records, {} peers",
        unit.collector,
        unit.record_type,
        unit.start,
        unit.end,
        record_count,
        peers.len()
    );

    // the output bucket key is the unit start truncated to the output
    // granularity so slices of the same day merge in Stage A
    let bucket = floor_to(unit.start, RESULT_GRANULARITY);
    Ok(peers
        .into_iter()
        .map(|(sig, counters)| ((bucket, unit.collector.clone(), sig), counters))
        .collect())
}

/// Runs the full pipeline: build units, execute them on the worker pool,
/// reduce at all three resolutions.
///
/// `open` is called once per unit, on the worker that runs it, to produce
/// that unit's private source. Any unit error is fatal to the whole run.
pub fn analyze<S, F>(cfg: &AnalyzeConfig, open: F) -> Result<Analysis, StreamError>
where
    S: RecordSource,
    F: Fn(&UnitOfWork) -> Result<S, StreamError> + Sync,
{
    let (start, end, units) = build_units(cfg.start, cfg.end, cfg.record_type, &cfg.collectors);
    info!(
        "analyzing [{}, {}) across {} collectors: {} units on {} workers",
        start,
        end,
        cfg.collectors.len(),
        units.len(),
        cfg.workers
    );

    let results = pool::map_reduce(units, cfg.workers, |unit| {
        let source = open(&unit)?;
        run_unit(source, &unit)
    });

    let mut rows: Vec<PeerRow> = vec![];
    for result in results {
        rows.extend(result?);
    }

    let per_peer = reduce_by_peer(rows);
    let per_collector = reduce_by_collector(&per_peer);
    let per_time = reduce_by_time(&per_collector);

    Ok(Analysis {
        start,
        end,
        record_type: cfg.record_type,
        per_peer,
        per_collector,
        per_time,
    })
}
