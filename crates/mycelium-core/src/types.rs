//! Shared types used across all Mycelium crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MyceliumError;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Monotonic count of completed simulation ticks.
pub type Tick = u64;

/// Stable string key identifying a room (a node in the navigation graph).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Separator used when an edge key is displayed, and in the legacy string form.
pub const EDGE_KEY_SEPARATOR: char = '|';

/// Undirected edge between two rooms.
///
/// The endpoints are stored in lexicographic order, so `EdgeKey::new(a, b)`
/// and `EdgeKey::new(b, a)` are the same key. Serialized as a `[low, high]`
/// pair so any room id survives a round trip, including ids that contain the
/// separator or are empty. The `"a|b"` form is display only; it is still
/// accepted on input for records written by older builds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    low: RoomId,
    high: RoomId,
}

impl EdgeKey {
    pub fn new(a: &RoomId, b: &RoomId) -> Self {
        if a <= b {
            Self { low: a.clone(), high: b.clone() }
        } else {
            Self { low: b.clone(), high: a.clone() }
        }
    }

    /// The lexicographically smaller endpoint.
    pub fn low(&self) -> &RoomId {
        &self.low
    }

    /// The lexicographically larger endpoint.
    pub fn high(&self) -> &RoomId {
        &self.high
    }

    /// Whether `room` is one of the endpoints.
    pub fn touches(&self, room: &RoomId) -> bool {
        &self.low == room || &self.high == room
    }

    /// The endpoint opposite `room`, if `room` is an endpoint.
    pub fn other(&self, room: &RoomId) -> Option<&RoomId> {
        if &self.low == room {
            Some(&self.high)
        } else if &self.high == room {
            Some(&self.low)
        } else {
            None
        }
    }

    /// A self-loop never carries trail or nutrient.
    pub fn is_loop(&self) -> bool {
        self.low == self.high
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.low, EDGE_KEY_SEPARATOR, self.high)
    }
}

impl FromStr for EdgeKey {
    type Err = MyceliumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(EDGE_KEY_SEPARATOR) {
            Some((a, b)) if !a.is_empty() && !b.is_empty() => {
                Ok(EdgeKey::new(&RoomId::from(a), &RoomId::from(b)))
            }
            _ => Err(MyceliumError::invalid_edge_key(s)),
        }
    }
}

impl Serialize for EdgeKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.low, &self.high).serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EdgeKeyRepr {
    Pair(RoomId, RoomId),
    Legacy(String),
}

impl<'de> Deserialize<'de> for EdgeKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match EdgeKeyRepr::deserialize(deserializer)? {
            EdgeKeyRepr::Pair(a, b) => Ok(EdgeKey::new(&a, &b)),
            EdgeKeyRepr::Legacy(raw) => raw.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Whether an edge came from the base graph or was grown at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    Static,
    Grown,
}

/// An external memory that is degrading over time.
///
/// `decay_degree` runs from 0.0 (fresh) to 1.0 (fully decayed). Items above
/// the compost threshold are converted into nutrient exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayingItem {
    pub id: String,
    pub decay_degree: f64,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl DecayingItem {
    pub fn new(id: impl Into<String>, decay_degree: f64) -> Self {
        Self {
            id: id.into(),
            decay_degree,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_key_is_undirected() {
        let a = RoomId::from("cellar");
        let b = RoomId::from("attic");
        let k1 = EdgeKey::new(&a, &b);
        let k2 = EdgeKey::new(&b, &a);
        assert_eq!(k1, k2);
        assert_eq!(k1.low().as_str(), "attic");
        assert_eq!(k1.other(&a), Some(&b));
        assert_eq!(k1.other(&RoomId::from("garden")), None);
    }

    #[test]
    fn edge_key_parses_and_prints() {
        let key: EdgeKey = "moss|fern".parse().unwrap();
        assert_eq!(key.to_string(), "fern|moss");
        assert!("no-separator".parse::<EdgeKey>().is_err());
        assert!("|half".parse::<EdgeKey>().is_err());
    }

    #[test]
    fn edge_key_serializes_as_ordered_pair() {
        let key = EdgeKey::new(&RoomId::from("b"), &RoomId::from("a"));
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"["a","b"]"#);

        let back: EdgeKey = serde_json::from_str(r#"["b","a"]"#).unwrap();
        assert_eq!(back, key);
        let legacy: EdgeKey = serde_json::from_str(r#""b|a""#).unwrap();
        assert_eq!(legacy, key);
    }

    #[test]
    fn separator_and_empty_ids_survive_serde() {
        let piped = EdgeKey::new(&RoomId::from("hall|east"), &RoomId::from("kitchen"));
        let empty = EdgeKey::new(&RoomId::from(""), &RoomId::from("x"));
        let json = serde_json::to_string(&vec![&piped, &empty]).unwrap();

        let back: Vec<EdgeKey> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![piped, empty]);
        assert_eq!(back[0].low().as_str(), "hall|east");
        assert_eq!(back[1].low().as_str(), "");
    }

    #[test]
    fn decaying_item_payload_defaults_to_null() {
        let item: DecayingItem = serde_json::from_str(r#"{"id":"m1","decay_degree":0.8}"#).unwrap();
        assert_eq!(item.payload, serde_json::Value::Null);
    }
}
