/*!
Time bucketing arithmetic for the aggregation pipeline.

Output rows are keyed by fixed-length time buckets; processing is split into
shorter per-collector slices so units of work stay small.
*/
use crate::models::RecordType;

/// Output granularity: one data point per day.
pub const RESULT_GRANULARITY: u64 = 3600 * 24;

/// RIB processing slice length for Route Views collectors.
pub const RV_RIB_PROCESSING_GRANULARITY: u64 = 3600 * 4;
/// RIB processing slice length for RIS collectors.
pub const RIS_RIB_PROCESSING_GRANULARITY: u64 = 3600 * 8;
/// Update processing slice length.
pub const UPD_PROCESSING_GRANULARITY: u64 = 3600 * 2;

/// Rounds a timestamp down to a multiple of `granularity`.
pub fn floor_to(ts: u64, granularity: u64) -> u64 {
    ts / granularity * granularity
}

/// Rounds a timestamp up to a multiple of `granularity`. An interval that
/// does not divide evenly gets a trailing partial bucket.
pub fn ceil_to(ts: u64, granularity: u64) -> u64 {
    let floored = floor_to(ts, granularity);
    if floored == ts {
        ts
    } else {
        floored + granularity
    }
}

/// Splits `[start, end)` into consecutive half-open slices of `len` seconds.
/// The interval is assumed to be a multiple of `len`.
pub fn partition_time(start: u64, end: u64, len: u64) -> Vec<(u64, u64)> {
    let mut slices = vec![];
    let mut start = start;
    while start < end {
        slices.push((start, start + len));
        start += len;
    }
    slices
}

/// Processing slice length for one collector and record type. RIB dumps are
/// larger for RIS collectors (8h chunks) than for Route Views (4h); update
/// files are small enough for 2h chunks everywhere.
pub fn processing_granularity(record_type: RecordType, collector: &str) -> u64 {
    match record_type {
        RecordType::Updates => UPD_PROCESSING_GRANULARITY,
        RecordType::Rib => {
            if collector.contains("rrc") {
                RIS_RIB_PROCESSING_GRANULARITY
            } else {
                RV_RIB_PROCESSING_GRANULARITY
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_to() {
        assert_eq!(floor_to(1427846400, RESULT_GRANULARITY), 1427846400);
        assert_eq!(floor_to(1427846570, RESULT_GRANULARITY), 1427846400);
    }

    #[test]
    fn test_ceil_to() {
        assert_eq!(ceil_to(1427846400, RESULT_GRANULARITY), 1427846400);
        assert_eq!(ceil_to(1427900000, RESULT_GRANULARITY), 1427932800);
    }

    #[test]
    fn test_partition_time() {
        let slices = partition_time(0, 3 * RESULT_GRANULARITY, RESULT_GRANULARITY);
        assert_eq!(
            slices,
            vec![
                (0, RESULT_GRANULARITY),
                (RESULT_GRANULARITY, 2 * RESULT_GRANULARITY),
                (2 * RESULT_GRANULARITY, 3 * RESULT_GRANULARITY),
            ]
        );
        assert!(partition_time(100, 100, 10).is_empty());
    }

    #[test]
    fn test_processing_granularity() {
        assert_eq!(
            processing_granularity(RecordType::Updates, "rrc06"),
            UPD_PROCESSING_GRANULARITY
        );
        assert_eq!(
            processing_granularity(RecordType::Rib, "rrc06"),
            RIS_RIB_PROCESSING_GRANULARITY
        );
        assert_eq!(
            processing_granularity(RecordType::Rib, "route-views.sg"),
            RV_RIB_PROCESSING_GRANULARITY
        );
    }
}
