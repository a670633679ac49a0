//! Vertex identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GraphError;

/// Wire token rendering the start sentinel.
pub const START_TOKEN: &str = "__BEGIN__";

/// Wire token rendering the end sentinel.
pub const END_TOKEN: &str = "__END__";

/// Identifier for vertices within a [`Graph`](crate::Graph).
///
/// Either a host-assigned numeric id or one of the two reserved sentinels
/// that frame every graph. The ordering is total: `Start` sorts before every
/// numeric id and `End` after, so identifier comparisons never fall back to
/// string/number ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexId {
    /// The entry sentinel, rendered as `__BEGIN__`.
    Start,
    /// A host-assigned numeric id.
    Num(u64),
    /// The exit sentinel, rendered as `__END__`.
    End,
}

impl VertexId {
    /// Whether this id is one of the two reserved sentinels.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, VertexId::Start | VertexId::End)
    }

    /// Whether this id is the start sentinel.
    pub fn is_start(&self) -> bool {
        matches!(self, VertexId::Start)
    }

    /// Whether this id is the end sentinel.
    pub fn is_end(&self) -> bool {
        matches!(self, VertexId::End)
    }

    /// The numeric value, if this is not a sentinel.
    pub fn as_num(&self) -> Option<u64> {
        match self {
            VertexId::Num(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexId::Start => f.write_str(START_TOKEN),
            VertexId::Num(value) => write!(f, "{value}"),
            VertexId::End => f.write_str(END_TOKEN),
        }
    }
}

impl FromStr for VertexId {
    type Err = GraphError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            START_TOKEN => Ok(VertexId::Start),
            END_TOKEN => Ok(VertexId::End),
            _ => raw
                .parse::<u64>()
                .map(VertexId::Num)
                .map_err(|_| GraphError::InvalidIdentifier {
                    token: raw.to_string(),
                }),
        }
    }
}

impl From<u64> for VertexId {
    fn from(value: u64) -> Self {
        VertexId::Num(value)
    }
}

// Serialized as the wire token so projection maps key cleanly in JSON.
impl Serialize for VertexId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VertexId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_frame_numeric_ids() {
        assert!(VertexId::Start < VertexId::Num(0));
        assert!(VertexId::Num(0) < VertexId::Num(7));
        assert!(VertexId::Num(u64::MAX) < VertexId::End);
    }

    #[test]
    fn test_display_round_trip() {
        for id in [VertexId::Start, VertexId::Num(42), VertexId::End] {
            let rendered = id.to_string();
            assert_eq!(rendered.parse::<VertexId>().unwrap(), id);
        }
    }

    #[test]
    fn test_invalid_token_rejected() {
        assert!("chapter_one".parse::<VertexId>().is_err());
        assert!("-3".parse::<VertexId>().is_err());
    }

    #[test]
    fn test_serde_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(VertexId::Start, 1u32);
        map.insert(VertexId::Num(5), 2u32);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"__BEGIN__":1,"5":2}"#);

        let back: std::collections::BTreeMap<VertexId, u32> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
