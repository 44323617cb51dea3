use crate::error::StreamError;
use ipnet::IpNet;
use itertools::Itertools;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::str::FromStr;

/// ASN -- Autonomous System Number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Asn(pub u32);

impl Display for Asn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Asn {
    fn from(v: u32) -> Self {
        Asn(v)
    }
}

impl FromStr for Asn {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match u32::from_str(s) {
            Ok(v) => Ok(Asn(v)),
            Err(_) => Err(StreamError::FilterError(format!(
                "cannot parse ASN from {}",
                s
            ))),
        }
    }
}

/// An AS path as a plain ASN sequence.
///
/// Serialized as the space-separated string form used in element dumps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AsPath(pub Vec<Asn>);

impl AsPath {
    pub fn new(asns: Vec<Asn>) -> Self {
        AsPath(asns)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The origin ASN, i.e. the last ASN on the path.
    pub fn origin(&self) -> Option<Asn> {
        self.0.last().copied()
    }

    /// Iterates over consecutive ASN pairs, collapsing prepend runs so a
    /// prepended ASN never pairs with itself.
    pub fn adjacencies(&self) -> impl Iterator<Item = (Asn, Asn)> + '_ {
        self.0.iter().copied().dedup().tuple_windows()
    }
}

impl Display for AsPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

impl FromStr for AsPath {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let asns = s
            .split_whitespace()
            .map(Asn::from_str)
            .collect::<Result<Vec<Asn>, StreamError>>()?;
        Ok(AsPath(asns))
    }
}

impl Serialize for AsPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AsPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AsPath::from_str(&s).map_err(D::Error::custom)
    }
}

/// Origin attribute of a RIB entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    IGP,
    EGP,
    INCOMPLETE,
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Origin::IGP => "IGP",
            Origin::EGP => "EGP",
            Origin::INCOMPLETE => "INCOMPLETE",
        };
        write!(f, "{}", s)
    }
}

/// The type of a routing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElemType {
    Announcement,
    Withdrawal,
    RibEntry,
    PeerState,
}

impl ElemType {
    /// Single-letter code used in columnar dumps.
    pub fn code(&self) -> char {
        match self {
            ElemType::Announcement => 'A',
            ElemType::Withdrawal => 'W',
            ElemType::RibEntry => 'R',
            ElemType::PeerState => 'S',
        }
    }
}

impl Display for ElemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ElemType {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" | "announce" | "announcement" => Ok(ElemType::Announcement),
            "W" | "w" | "withdraw" | "withdrawal" => Ok(ElemType::Withdrawal),
            "R" | "r" | "rib" | "rib-entry" => Ok(ElemType::RibEntry),
            "S" | "s" | "state" | "peer-state" => Ok(ElemType::PeerState),
            _ => Err(StreamError::FilterError(format!(
                "cannot parse elem type from {}",
                s
            ))),
        }
    }
}

/// Per-type element payload.
///
/// Each variant carries exactly the fields valid for that element type,
/// resolved when the record is decoded rather than looked up by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElemDetails {
    Announcement {
        prefix: IpNet,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        as_path: Option<AsPath>,
    },
    Withdrawal {
        prefix: IpNet,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        as_path: Option<AsPath>,
    },
    RibEntry {
        prefix: IpNet,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        as_path: Option<AsPath>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<Origin>,
    },
    PeerState,
}

/// One routing element extracted from a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamElem {
    pub peer_asn: Asn,
    pub peer_address: IpAddr,
    #[serde(flatten)]
    pub details: ElemDetails,
}

impl StreamElem {
    pub fn elem_type(&self) -> ElemType {
        match &self.details {
            ElemDetails::Announcement { .. } => ElemType::Announcement,
            ElemDetails::Withdrawal { .. } => ElemType::Withdrawal,
            ElemDetails::RibEntry { .. } => ElemType::RibEntry,
            ElemDetails::PeerState => ElemType::PeerState,
        }
    }

    pub fn prefix(&self) -> Option<IpNet> {
        match &self.details {
            ElemDetails::Announcement { prefix, .. }
            | ElemDetails::Withdrawal { prefix, .. }
            | ElemDetails::RibEntry { prefix, .. } => Some(*prefix),
            ElemDetails::PeerState => None,
        }
    }

    pub fn as_path(&self) -> Option<&AsPath> {
        match &self.details {
            ElemDetails::Announcement { as_path, .. }
            | ElemDetails::Withdrawal { as_path, .. }
            | ElemDetails::RibEntry { as_path, .. } => as_path.as_ref(),
            ElemDetails::PeerState => None,
        }
    }
}

struct OptionToStr<'a, T>(&'a Option<T>);

impl<T: Display> Display for OptionToStr<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{}", v),
            None => Ok(()),
        }
    }
}

impl Display for StreamElem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.elem_type(),
            self.peer_address,
            self.peer_asn,
            OptionToStr(&self.prefix()),
            OptionToStr(&self.as_path().map(|p| p.to_string())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(path: &str) -> StreamElem {
        StreamElem {
            peer_asn: Asn(25152),
            peer_address: "192.0.2.1".parse().unwrap(),
            details: ElemDetails::Announcement {
                prefix: "10.0.0.0/8".parse().unwrap(),
                as_path: Some(path.parse().unwrap()),
            },
        }
    }

    #[test]
    fn test_as_path_adjacencies_skip_prepends() {
        let path = AsPath::from_str("701 701 3356 3356 3356 13335").unwrap();
        let pairs: Vec<(Asn, Asn)> = path.adjacencies().collect();
        assert_eq!(pairs, vec![(Asn(701), Asn(3356)), (Asn(3356), Asn(13335))]);
    }

    #[test]
    fn test_as_path_round_trip() {
        let path = AsPath::from_str("701 3356 13335").unwrap();
        assert_eq!(path.to_string(), "701 3356 13335");
        assert_eq!(path.origin(), Some(Asn(13335)));
    }

    #[test]
    fn test_elem_accessors() {
        let elem = announcement("701 3356");
        assert_eq!(elem.elem_type(), ElemType::Announcement);
        assert_eq!(elem.prefix().unwrap().to_string(), "10.0.0.0/8");
        assert_eq!(elem.as_path().unwrap().len(), 2);

        let state = StreamElem {
            peer_asn: Asn(25152),
            peer_address: "192.0.2.1".parse().unwrap(),
            details: ElemDetails::PeerState,
        };
        assert_eq!(state.elem_type(), ElemType::PeerState);
        assert!(state.prefix().is_none());
        assert!(state.as_path().is_none());
    }

    #[test]
    fn test_elem_serde_tagged() {
        let elem = announcement("701 3356");
        let json = serde_json::to_string(&elem).unwrap();
        assert!(json.contains(r#""type":"announcement""#));
        let back: StreamElem = serde_json::from_str(&json).unwrap();
        assert_eq!(elem, back);

        let state_json = r#"{"peer_asn": 513, "peer_address": "2001:db8::1", "type": "peer-state"}"#;
        let state: StreamElem = serde_json::from_str(state_json).unwrap();
        assert_eq!(state.elem_type(), ElemType::PeerState);
    }

    #[test]
    fn test_elem_display() {
        let elem = announcement("701 3356");
        assert_eq!(elem.to_string(), "A|192.0.2.1|25152|10.0.0.0/8|701 3356");
    }
}
