/*!
Collector inventory: which collectors a run should cover.

The broker's collector-list document is a small JSON object; only collectors
belonging to the two major archive projects are kept. For offline inputs the
inventory can instead be scanned out of the records themselves.
*/
use crate::error::StreamError;
use crate::stream::source::RecordSource;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// The broker meta endpoint listing known collectors.
pub const DEFAULT_BROKER_URL: &str = "http://bgpstream.caida.org/broker/meta/collectors";

/// The archive projects a run cares about.
pub const PROJECTS: [&str; 2] = ["routeviews", "ris"];

#[derive(Debug, Deserialize)]
struct CollectorsDocument {
    data: CollectorsData,
}

#[derive(Debug, Deserialize)]
struct CollectorsData {
    collectors: HashMap<String, CollectorInfo>,
}

#[derive(Debug, Deserialize)]
struct CollectorInfo {
    project: String,
}

fn filter_projects(doc: CollectorsDocument) -> Vec<String> {
    let mut collectors: Vec<String> = doc
        .data
        .collectors
        .into_iter()
        .filter(|(_, info)| PROJECTS.contains(&info.project.as_str()))
        .map(|(name, _)| name)
        .collect();
    collectors.sort();
    collectors
}

/// Fetches the collector list from a broker meta URL.
pub fn get_collectors(url: &str) -> Result<Vec<String>, StreamError> {
    let reader = oneio::get_reader(url)?;
    let doc: CollectorsDocument = serde_json::from_reader(reader)?;
    Ok(filter_projects(doc))
}

/// Scans a source for the distinct collector names it contains.
pub fn collectors_in_source<S: RecordSource>(mut source: S) -> Result<Vec<String>, StreamError> {
    let mut names = BTreeSet::new();
    while let Some(record) = source.next_record()? {
        names.insert(record.collector);
    }
    Ok(names.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordStatus, RecordType, StreamRecord};
    use crate::stream::source::MemorySource;

    #[test]
    fn test_collector_document_filtering() {
        let doc: CollectorsDocument = serde_json::from_str(
            r#"{
                "data": {
                    "collectors": {
                        "rrc00": {"project": "ris"},
                        "route-views.sg": {"project": "routeviews"},
                        "internal-test": {"project": "lab"}
                    }
                }
            }"#,
        )
        .unwrap();
        let collectors = filter_projects(doc);
        assert_eq!(collectors, vec!["route-views.sg", "rrc00"]);
    }

    #[test]
    fn test_collectors_in_source() {
        let record = |collector: &str| StreamRecord {
            project: "ris".to_string(),
            collector: collector.to_string(),
            record_type: RecordType::Updates,
            status: RecordStatus::Valid,
            timestamp: 0,
            elems: vec![],
        };
        let source = MemorySource::new(vec![
            record("rrc06"),
            record("rrc00"),
            record("rrc06"),
        ]);
        assert_eq!(
            collectors_in_source(source).unwrap(),
            vec!["rrc00", "rrc06"]
        );
    }
}
