/*!
The stream surface: configure filters, start, pull records.

A [BgpStream] wraps a [RecordSource] and applies record-level filters, the
time-interval filter, and element-level filters to everything the source
produces. The consumption protocol is two-level pull: the outer level yields
records until the source is exhausted, the inner level walks the elements of
the record at hand.
*/
pub mod filter;
pub mod iters;
pub mod source;

use crate::error::StreamError;
use crate::models::StreamRecord;
use crate::stream::filter::{parse_filter_string, Filter, Filterable};
use crate::stream::source::RecordSource;

pub struct BgpStream<S> {
    source: S,
    filters: Vec<Filter>,
    /// Time interval filter, inclusive on both ends.
    interval: Option<(u64, u64)>,
    started: bool,
}

impl<S> BgpStream<S> {
    pub fn new(source: S) -> BgpStream<S> {
        BgpStream {
            source,
            filters: vec![],
            interval: None,
            started: false,
        }
    }

    /// Adds a named filter. Unknown names and unparseable values are
    /// configuration errors.
    pub fn add_filter(
        mut self,
        filter_type: &str,
        filter_value: &str,
    ) -> Result<Self, StreamError> {
        self.filters.push(Filter::new(filter_type, filter_value)?);
        Ok(self)
    }

    /// Restricts the stream to records with `start <= timestamp <= end`.
    pub fn add_interval_filter(self, start: u64, end: u64) -> Self {
        BgpStream {
            interval: Some((start, end)),
            ..self
        }
    }

    /// Adds all filters described by a free-text filter expression, e.g.
    /// `"collector rrc06 and type updates"`.
    pub fn add_filter_string(mut self, expr: &str) -> Result<Self, StreamError> {
        self.filters.extend(parse_filter_string(expr)?);
        Ok(self)
    }

    /// Validates the configuration and transitions the stream to iterable.
    ///
    /// Invalid configuration is fatal to the unit of work that owns the
    /// stream; there is no retry.
    pub fn start(self) -> Result<Self, StreamError> {
        if self.started {
            return Err(StreamError::ConfigError(
                "stream already started".to_string(),
            ));
        }
        if let Some((start, end)) = self.interval {
            if start > end {
                return Err(StreamError::ConfigError(format!(
                    "interval start {} is after end {}",
                    start, end
                )));
            }
        }
        Ok(BgpStream {
            started: true,
            ..self
        })
    }
}

impl<S: RecordSource> BgpStream<S> {
    /// Pulls the next record that matches the configured filters, or
    /// `Ok(None)` once the source is exhausted.
    ///
    /// Element-level filters are applied to the elements of each surviving
    /// record; a record whose elements are all filtered away is still
    /// returned when its own fields match.
    pub fn next_record(&mut self) -> Result<Option<StreamRecord>, StreamError> {
        if !self.started {
            return Err(StreamError::ConfigError(
                "stream must be started before records are pulled".to_string(),
            ));
        }
        loop {
            let Some(mut record) = self.source.next_record()? else {
                return Ok(None);
            };
            if let Some((start, end)) = self.interval {
                if record.timestamp < start || record.timestamp > end {
                    continue;
                }
            }
            if !record.match_filters(&self.filters) {
                continue;
            }
            if self.filters.iter().any(|f| !f.is_record_level()) {
                let filters = &self.filters;
                record.elems.retain(|e| e.match_filters(filters));
            }
            return Ok(Some(record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;
    use crate::stream::source::MemorySource;

    fn record(collector: &str, record_type: RecordType, ts: u64, peers: &[u32]) -> StreamRecord {
        StreamRecord {
            project: "ris".to_string(),
            collector: collector.to_string(),
            record_type,
            status: RecordStatus::Valid,
            timestamp: ts,
            elems: peers
                .iter()
                .map(|asn| StreamElem {
                    peer_asn: Asn(*asn),
                    peer_address: "192.0.2.1".parse().unwrap(),
                    details: ElemDetails::Announcement {
                        prefix: "10.0.0.0/8".parse().unwrap(),
                        as_path: None,
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn test_pull_before_start_is_an_error() {
        let mut stream = BgpStream::new(MemorySource::default());
        assert!(matches!(
            stream.next_record(),
            Err(StreamError::ConfigError(_))
        ));
    }

    #[test]
    fn test_double_start_is_an_error() {
        let stream = BgpStream::new(MemorySource::default()).start().unwrap();
        assert!(stream.start().is_err());
    }

    #[test]
    fn test_bad_interval_fails_at_start() {
        let stream = BgpStream::new(MemorySource::default()).add_interval_filter(100, 50);
        assert!(matches!(
            stream.start(),
            Err(StreamError::ConfigError(_))
        ));
    }

    #[test]
    fn test_unknown_filter_name_is_an_error() {
        let result = BgpStream::new(MemorySource::default()).add_filter("data-type", "updates");
        assert!(matches!(result, Err(StreamError::FilterError(_))));
    }

    #[test]
    fn test_record_level_filtering() {
        let source = MemorySource::new(vec![
            record("rrc06", RecordType::Updates, 10, &[1]),
            record("rrc00", RecordType::Updates, 11, &[1]),
            record("rrc06", RecordType::Rib, 12, &[1]),
            record("rrc06", RecordType::Updates, 13, &[1]),
        ]);
        let mut stream = BgpStream::new(source)
            .add_filter("collector", "rrc06")
            .unwrap()
            .add_filter("record-type", "updates")
            .unwrap()
            .start()
            .unwrap();

        let mut timestamps = vec![];
        while let Some(rec) = stream.next_record().unwrap() {
            timestamps.push(rec.timestamp);
        }
        assert_eq!(timestamps, vec![10, 13]);
    }

    #[test]
    fn test_interval_filter_is_inclusive() {
        let source = MemorySource::new(vec![
            record("rrc06", RecordType::Updates, 9, &[1]),
            record("rrc06", RecordType::Updates, 10, &[1]),
            record("rrc06", RecordType::Updates, 20, &[1]),
            record("rrc06", RecordType::Updates, 21, &[1]),
        ]);
        let mut stream = BgpStream::new(source)
            .add_interval_filter(10, 20)
            .start()
            .unwrap();

        let mut timestamps = vec![];
        while let Some(rec) = stream.next_record().unwrap() {
            timestamps.push(rec.timestamp);
        }
        assert_eq!(timestamps, vec![10, 20]);
    }

    #[test]
    fn test_elem_level_filter_keeps_record() {
        let source = MemorySource::new(vec![record("rrc06", RecordType::Updates, 10, &[1, 2, 3])]);
        let mut stream = BgpStream::new(source)
            .add_filter("peer-asn", "2")
            .unwrap()
            .start()
            .unwrap();

        let rec = stream.next_record().unwrap().unwrap();
        assert_eq!(rec.elems.len(), 1);
        assert_eq!(rec.elems[0].peer_asn, Asn(2));

        // no matching elements: the record still surfaces, empty
        let source = MemorySource::new(vec![record("rrc06", RecordType::Updates, 10, &[1])]);
        let mut stream = BgpStream::new(source)
            .add_filter("peer-asn", "9")
            .unwrap()
            .start()
            .unwrap();
        let rec = stream.next_record().unwrap().unwrap();
        assert!(rec.elems.is_empty());
    }

    #[test]
    fn test_filter_string() {
        let source = MemorySource::new(vec![
            record("rrc06", RecordType::Updates, 10, &[1]),
            record("rrc00", RecordType::Updates, 11, &[1]),
        ]);
        let mut stream = BgpStream::new(source)
            .add_filter_string("collector rrc06 and type updates")
            .unwrap()
            .start()
            .unwrap();
        assert_eq!(stream.next_record().unwrap().unwrap().timestamp, 10);
        assert!(stream.next_record().unwrap().is_none());
    }
}
