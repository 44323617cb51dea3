use crate::error::StreamError;
use crate::error::StreamError::FilterError;
use crate::models::{Asn, ElemType, RecordType, StreamElem, StreamRecord};
use ipnet::IpNet;
use regex::Regex;
use std::net::IpAddr;
use std::str::FromStr;

/// A single stream filter, built from a name/value string pair.
///
/// `project`, `collector` and `record-type` apply to records; the remaining
/// filters apply to the elements of records that survive the record level.
#[derive(Debug, Clone)]
pub enum Filter {
    Project(String),
    Collector(String),
    RecordType(RecordType),
    PeerAsn(Asn),
    PeerIp(IpAddr),
    Prefix(IpNet),
    ElemType(ElemType),
    AsPath(Regex),
}

impl Filter {
    pub fn new(filter_type: &str, filter_value: &str) -> Result<Filter, StreamError> {
        match filter_type {
            "project" => Ok(Filter::Project(filter_value.to_string())),
            "collector" => Ok(Filter::Collector(filter_value.to_string())),
            "record-type" => Ok(Filter::RecordType(RecordType::from_str(filter_value)?)),
            "peer-asn" => Ok(Filter::PeerAsn(Asn::from_str(filter_value)?)),
            "peer-ip" => match IpAddr::from_str(filter_value) {
                Ok(v) => Ok(Filter::PeerIp(v)),
                Err(_) => Err(FilterError(format!(
                    "cannot parse peer IP from {}",
                    filter_value
                ))),
            },
            "prefix" => match IpNet::from_str(filter_value) {
                Ok(v) => Ok(Filter::Prefix(v)),
                Err(_) => Err(FilterError(format!(
                    "cannot parse prefix from {}",
                    filter_value
                ))),
            },
            "elem-type" => Ok(Filter::ElemType(ElemType::from_str(filter_value)?)),
            "aspath" => match Regex::from_str(filter_value) {
                Ok(v) => Ok(Filter::AsPath(v)),
                Err(_) => Err(FilterError(format!(
                    "cannot parse AS path regex from {}",
                    filter_value
                ))),
            },
            _ => Err(FilterError(format!(
                "unknown filter type: {}",
                filter_type
            ))),
        }
    }

    /// Whether this filter is checked against records rather than elements.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            Filter::Project(_) | Filter::Collector(_) | Filter::RecordType(_)
        )
    }
}

pub trait Filterable {
    fn match_filter(&self, filter: &Filter) -> bool;

    fn match_filters(&self, filters: &[Filter]) -> bool {
        filters.iter().all(|f| self.match_filter(f))
    }
}

impl Filterable for StreamRecord {
    fn match_filter(&self, filter: &Filter) -> bool {
        match filter {
            Filter::Project(v) => self.project == *v,
            Filter::Collector(v) => self.collector == *v,
            Filter::RecordType(v) => self.record_type == *v,
            // element-level filters do not reject records
            _ => true,
        }
    }
}

impl Filterable for StreamElem {
    fn match_filter(&self, filter: &Filter) -> bool {
        match filter {
            Filter::PeerAsn(v) => self.peer_asn == *v,
            Filter::PeerIp(v) => self.peer_address == *v,
            Filter::Prefix(v) => self.prefix() == Some(*v),
            Filter::ElemType(v) => self.elem_type() == *v,
            Filter::AsPath(v) => match self.as_path() {
                Some(path) => v.is_match(path.to_string().as_str()),
                None => false,
            },
            // record-level filters were already applied
            _ => true,
        }
    }
}

/// Parses a free-text filter expression into filters.
///
/// The expression is a sequence of `term value` clauses joined by `and`,
/// using the term vocabulary of the classic stream filter language:
/// `project`/`proj`, `collector`/`coll`, `type`, `peer`, `prefix`/`pref`,
/// `aspath`/`path`, `elemtype`. Values may be double-quoted.
///
/// ```
/// use bgpstream_stats::parse_filter_string;
///
/// let filters = parse_filter_string("collector rrc06 and type updates").unwrap();
/// assert_eq!(filters.len(), 2);
/// ```
pub fn parse_filter_string(expr: &str) -> Result<Vec<Filter>, StreamError> {
    let mut filters = vec![];
    for clause in expr.split(" and ") {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }
        let (term, value) = clause.split_once(char::is_whitespace).ok_or_else(|| {
            FilterError(format!("expected a term and a value, got: {}", clause))
        })?;
        let value = value.trim().trim_matches('"');
        let filter_type = match term {
            "project" | "proj" => "project",
            "collector" | "coll" => "collector",
            "type" => "record-type",
            "peer" => "peer-asn",
            "prefix" | "pref" => "prefix",
            "aspath" | "path" => "aspath",
            "elemtype" => "elem-type",
            _ => return Err(FilterError(format!("unknown filter term: {}", term))),
        };
        filters.push(Filter::new(filter_type, value)?);
    }
    Ok(filters)
}
