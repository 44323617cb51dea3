use crate::error::StreamError;
use crate::models::StreamElem;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Record type of an MRT dump: a full table snapshot or an update batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    #[serde(rename = "ribs")]
    Rib,
    #[serde(rename = "updates")]
    Updates,
}

impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordType::Rib => write!(f, "ribs"),
            RecordType::Updates => write!(f, "updates"),
        }
    }
}

impl FromStr for RecordType {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rib" | "ribs" => Ok(RecordType::Rib),
            "update" | "updates" => Ok(RecordType::Updates),
            _ => Err(StreamError::FilterError(format!(
                "cannot parse record type from {}",
                s
            ))),
        }
    }
}

/// Status a data source attaches to a record it hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    #[default]
    Valid,
    FilteredSource,
    EmptySource,
    CorruptedSource,
    CorruptedRecord,
}

impl Display for RecordStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecordStatus::Valid => "valid",
            RecordStatus::FilteredSource => "filtered-source",
            RecordStatus::EmptySource => "empty-source",
            RecordStatus::CorruptedSource => "corrupted-source",
            RecordStatus::CorruptedRecord => "corrupted-record",
        };
        write!(f, "{}", s)
    }
}

/// One record pulled from a stream, together with the elements extracted
/// from it.
///
/// A record may touch zero or more peers; elements carry the per-peer data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRecord {
    pub project: String,
    pub collector: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default)]
    pub status: RecordStatus,
    /// Record timestamp in epoch seconds.
    pub timestamp: u64,
    #[serde(default)]
    pub elems: Vec<StreamElem>,
}
