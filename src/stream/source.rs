use crate::error::StreamError;
use crate::models::StreamRecord;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Lines, Read};

/// A backend that produces records for a [crate::BgpStream].
///
/// Sources are finite and not restartable: once `next_record` returns
/// `Ok(None)` the source is exhausted. Everything behind this trait --
/// MRT decoding, archive retrieval, broker protocols -- is outside the
/// scope of this crate.
pub trait RecordSource {
    fn next_record(&mut self) -> Result<Option<StreamRecord>, StreamError>;
}

/// An in-memory source backed by a record queue.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: VecDeque<StreamRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<StreamRecord>) -> Self {
        MemorySource {
            records: records.into(),
        }
    }
}

impl From<Vec<StreamRecord>> for MemorySource {
    fn from(records: Vec<StreamRecord>) -> Self {
        MemorySource::new(records)
    }
}

impl RecordSource for MemorySource {
    fn next_record(&mut self) -> Result<Option<StreamRecord>, StreamError> {
        Ok(self.records.pop_front())
    }
}

/// A source reading newline-delimited JSON records from a local path or a
/// URL. Transparently handles gzip/bzip2 compressed inputs.
pub struct JsonlSource {
    lines: Lines<BufReader<Box<dyn Read + Send>>>,
}

impl JsonlSource {
    pub fn open(path: &str) -> Result<Self, StreamError> {
        let reader = oneio::get_reader(path)?;
        Ok(JsonlSource {
            lines: BufReader::new(reader).lines(),
        })
    }

    pub fn from_reader(reader: Box<dyn Read + Send>) -> Self {
        JsonlSource {
            lines: BufReader::new(reader).lines(),
        }
    }
}

impl RecordSource for JsonlSource {
    fn next_record(&mut self) -> Result<Option<StreamRecord>, StreamError> {
        loop {
            match self.lines.next() {
                None => return Ok(None),
                Some(line) => {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Ok(Some(serde_json::from_str(&line)?));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_memory_source_drains_in_order() {
        let records = vec![
            StreamRecord {
                project: "ris".to_string(),
                collector: "rrc06".to_string(),
                record_type: crate::models::RecordType::Updates,
                status: Default::default(),
                timestamp: 1,
                elems: vec![],
            },
            StreamRecord {
                project: "ris".to_string(),
                collector: "rrc06".to_string(),
                record_type: crate::models::RecordType::Updates,
                status: Default::default(),
                timestamp: 2,
                elems: vec![],
            },
        ];
        let mut source = MemorySource::new(records);
        assert_eq!(source.next_record().unwrap().unwrap().timestamp, 1);
        assert_eq!(source.next_record().unwrap().unwrap().timestamp, 2);
        assert!(source.next_record().unwrap().is_none());
        // exhausted stays exhausted
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_jsonl_source_skips_blank_lines() {
        let data = concat!(
            r#"{"project":"ris","collector":"rrc06","type":"updates","timestamp":10}"#,
            "\n\n",
            r#"{"project":"ris","collector":"rrc06","type":"updates","timestamp":20}"#,
            "\n",
        );
        let mut source = JsonlSource::from_reader(Box::new(Cursor::new(data.as_bytes().to_vec())));
        assert_eq!(source.next_record().unwrap().unwrap().timestamp, 10);
        assert_eq!(source.next_record().unwrap().unwrap().timestamp, 20);
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_jsonl_source_malformed_line() {
        let mut source =
            JsonlSource::from_reader(Box::new(Cursor::new(b"not json at all".to_vec())));
        assert!(source.next_record().is_err());
    }
}
