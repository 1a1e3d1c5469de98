//! Property graph types.
//!
//! This module provides the entity model the exporter observes in a graph
//! store: nodes carrying a set of categories (labels) and relationships
//! carrying exactly one type name, both with a property map of native values.
//!
//! # Property Values
//!
//! | Variant | Native type | Text form |
//! |---------|-------------|-----------|
//! | `Integer` | `i64` | `42` |
//! | `Float` | `f64` | `4.2`, `1e300` |
//! | `Boolean` | `bool` | `true` |
//! | `Char` | `char` | `x` |
//! | `Date` | [`NaiveDate`] | `2024-01-31` |
//! | `OffsetTime` | [`OffsetTime`] | `10:15:30+01:00` |
//! | `LocalTime` | [`NaiveTime`] | `10:15:30` |
//! | `DateTime` | `DateTime<FixedOffset>` | `2024-01-31T10:15:30+01:00` |
//! | `LocalDateTime` | [`NaiveDateTime`] | `2024-01-31T10:15:30` |
//! | `String` | `String` | anything else |
//!
//! # Example
//!
//! ```rust
//! use tabgraph::models::graph::{Node, NodeId, PropertyValue};
//!
//! let node = Node::new(NodeId::new(7), ["Person"])
//!     .with_property("name", "Alice")
//!     .with_property("age", 42_i64);
//!
//! assert!(node.has_label("Person"));
//! assert_eq!(node.properties.get("age"), Some(&PropertyValue::Integer(42)));
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Store-assigned node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a node ID from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned relationship identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipId(u64);

impl RelationshipId {
    /// Creates a relationship ID from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A wall-clock time paired with a fixed UTC offset (`10:15:30+01:00`).
///
/// `chrono` has no offset-aware time-of-day type, so this pairs a
/// [`NaiveTime`] with a [`FixedOffset`].
///
/// Parsing accepts `±HH:MM` or `Z` only. Display writes a seconds part
/// when the offset has one (`+01:00:30`), and such text does not parse
/// back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OffsetTime {
    /// Local time of day.
    pub time: NaiveTime,
    /// Offset from UTC.
    pub offset: FixedOffset,
}

impl OffsetTime {
    /// Creates an offset time.
    #[must_use]
    pub const fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }
}

impl fmt::Display for OffsetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.time.format("%H:%M:%S%.f"), self.offset)
    }
}

impl FromStr for OffsetTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Borrow the RFC 3339 parser by anchoring the time to an arbitrary date.
        let anchored = DateTime::parse_from_rfc3339(&format!("1970-01-01T{s}"))?;
        Ok(Self {
            time: anchored.time(),
            offset: *anchored.offset(),
        })
    }
}

impl From<OffsetTime> for String {
    fn from(value: OffsetTime) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for OffsetTime {
    type Error = chrono::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A native property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Boolean(bool),
    /// Single character.
    Char(char),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day with a UTC offset.
    OffsetTime(OffsetTime),
    /// Time of day without offset.
    LocalTime(NaiveTime),
    /// Date-time with a UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Date-time without offset.
    LocalDateTime(NaiveDateTime),
    /// Free text.
    String(String),
}

impl PropertyValue {
    /// Returns the name of the value's type, for logs and summaries.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Char(_) => "char",
            Self::Date(_) => "date",
            Self::OffsetTime(_) => "offset_time",
            Self::LocalTime(_) => "local_time",
            Self::DateTime(_) => "date_time",
            Self::LocalDateTime(_) => "local_date_time",
            Self::String(_) => "string",
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<char> for PropertyValue {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<NaiveDate> for PropertyValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Property key to value mapping. Ordered so iteration is deterministic.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Relationship direction relative to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Relationships starting at the node.
    Outgoing,
    /// Relationships ending at the node.
    Incoming,
    /// Both directions.
    Both,
}

/// A node as observed in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Store-assigned identifier.
    pub id: NodeId,
    /// Categories (labels), in insertion order, without duplicates.
    pub labels: Vec<String>,
    /// Property values.
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Node {
    /// Creates a node with the given labels and no properties.
    #[must_use]
    pub fn new(id: NodeId, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut node = Self {
            id,
            labels: Vec::new(),
            properties: PropertyMap::new(),
        };
        for label in labels {
            node.add_label(label);
        }
        node
    }

    /// Adds a property to the node.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Adds a label unless already present. Returns true if it was added.
    pub fn add_label(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.has_label(&label) {
            return false;
        }
        self.labels.push(label);
        true
    }

    /// Returns true if the node carries the label.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// A relationship as observed in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Store-assigned identifier.
    pub id: RelationshipId,
    /// Relationship type name.
    pub rel_type: String,
    /// Start node.
    pub source: NodeId,
    /// End node.
    pub destination: NodeId,
    /// Property values.
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Relationship {
    /// Creates a relationship without properties.
    #[must_use]
    pub fn new(
        id: RelationshipId,
        rel_type: impl Into<String>,
        source: NodeId,
        destination: NodeId,
    ) -> Self {
        Self {
            id,
            rel_type: rel_type.into(),
            source,
            destination,
            properties: PropertyMap::new(),
        }
    }

    /// Adds a property to the relationship.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns the endpoint opposite to `node`.
    ///
    /// For a self-loop both endpoints are `node`.
    #[must_use]
    pub fn other_node(&self, node: NodeId) -> NodeId {
        if self.source == node {
            self.destination
        } else {
            self.source
        }
    }

    /// Returns true if the relationship touches `node` in the given direction.
    #[must_use]
    pub fn touches(&self, node: NodeId, direction: Direction) -> bool {
        match direction {
            Direction::Outgoing => self.source == node,
            Direction::Incoming => self.destination == node,
            Direction::Both => self.source == node || self.destination == node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_labels_deduplicated() {
        let mut node = Node::new(NodeId::new(1), ["Person", "Person", "Employee"]);
        assert_eq!(node.labels, vec!["Person", "Employee"]);
        assert!(!node.add_label("Employee"));
        assert!(node.add_label("Manager"));
        assert!(node.has_label("Manager"));
    }

    #[test]
    fn test_relationship_other_node() {
        let rel = Relationship::new(RelationshipId::new(1), "KNOWS", NodeId::new(1), NodeId::new(2));
        assert_eq!(rel.other_node(NodeId::new(1)), NodeId::new(2));
        assert_eq!(rel.other_node(NodeId::new(2)), NodeId::new(1));

        let lp = Relationship::new(RelationshipId::new(2), "SELF", NodeId::new(3), NodeId::new(3));
        assert_eq!(lp.other_node(NodeId::new(3)), NodeId::new(3));
    }

    #[test]
    fn test_relationship_touches() {
        let rel = Relationship::new(RelationshipId::new(1), "KNOWS", NodeId::new(1), NodeId::new(2));
        assert!(rel.touches(NodeId::new(1), Direction::Outgoing));
        assert!(!rel.touches(NodeId::new(1), Direction::Incoming));
        assert!(rel.touches(NodeId::new(2), Direction::Incoming));
        assert!(rel.touches(NodeId::new(2), Direction::Both));
        assert!(!rel.touches(NodeId::new(3), Direction::Both));
    }

    #[test]
    fn test_offset_time_parse_and_display() {
        let parsed: OffsetTime = "10:15:30+01:00".parse().unwrap();
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(10, 15, 30).unwrap());
        assert_eq!(parsed.offset, FixedOffset::east_opt(3600).unwrap());
        assert_eq!(parsed.to_string(), "10:15:30+01:00");

        let utc: OffsetTime = "23:59:01Z".parse().unwrap();
        assert_eq!(utc.offset, FixedOffset::east_opt(0).unwrap());
        assert!("10:15:30".parse::<OffsetTime>().is_err());
        assert!("10:15:30+01:00:30".parse::<OffsetTime>().is_err());
    }

    #[test]
    fn test_property_value_serde_roundtrip() {
        let node = Node::new(NodeId::new(4), ["City"])
            .with_property("name", "Paris")
            .with_property("population", 2_100_000_i64)
            .with_property("capital", true);

        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
