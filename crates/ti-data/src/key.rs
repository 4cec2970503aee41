//! Aggregation keys and buckets

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::record::{number_to_json, Record, Value};

/// Group key of a bucket.
///
/// Variants order as `Null < Number < Text < Composite`; numbers order
/// numerically and text lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AggregationKey {
    Null,
    Number(OrderedFloat<f64>),
    Text(String),
    Composite(CompositeKey),
}

impl AggregationKey {
    /// Key of a single field value
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => AggregationKey::Null,
            Value::Number(n) if n.is_nan() => AggregationKey::Null,
            Value::Number(n) => AggregationKey::Number(OrderedFloat(*n)),
            Value::Text(s) => AggregationKey::Text(s.clone()),
        }
    }

    /// Composite key of two or more fields of a record
    pub fn composite(fields: &[&str], record: &Record) -> Self {
        let parts = fields
            .iter()
            .map(|f| (f.to_string(), record.get(f).clone()))
            .collect();
        AggregationKey::Composite(CompositeKey::new(parts))
    }

    /// Numeric position of the key, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AggregationKey::Number(n) => Some(n.0),
            AggregationKey::Text(s) => s.parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Parts of a composite key
    pub fn parts(&self) -> Option<&[(String, Value)]> {
        match self {
            AggregationKey::Composite(c) => Some(c.parts()),
            _ => None,
        }
    }

    /// JSON form used in broadcast queries
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AggregationKey::Null => serde_json::Value::Null,
            AggregationKey::Number(n) => number_to_json(n.0),
            AggregationKey::Text(s) => serde_json::Value::String(s.clone()),
            AggregationKey::Composite(c) => serde_json::Value::String(c.encoded().to_string()),
        }
    }
}

impl fmt::Display for AggregationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationKey::Null => f.write_str("None"),
            AggregationKey::Number(n) => write!(f, "{}", number_to_json(n.0)),
            AggregationKey::Text(s) => f.write_str(s),
            AggregationKey::Composite(c) => f.write_str(c.encoded()),
        }
    }
}

impl Serialize for AggregationKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for AggregationKey {
    fn from(s: &str) -> Self {
        AggregationKey::Text(s.to_string())
    }
}

impl From<f64> for AggregationKey {
    fn from(n: f64) -> Self {
        AggregationKey::from_value(&Value::Number(n))
    }
}

/// Two (or more) field values serialised to a stable JSON object string.
///
/// Identity, hashing and ordering use the serialised form only.
#[derive(Debug, Clone)]
pub struct CompositeKey {
    encoded: String,
    parts: Vec<(String, Value)>,
}

impl CompositeKey {
    pub fn new(parts: Vec<(String, Value)>) -> Self {
        let body = parts
            .iter()
            .map(|(field, value)| {
                format!(
                    "{}:{}",
                    serde_json::Value::String(field.clone()),
                    value.to_json()
                )
            })
            .collect::<Vec<_>>()
            .join(",");

        Self {
            encoded: format!("{{{}}}", body),
            parts,
        }
    }

    /// Serialised form, e.g. `{"origin":"SEA","dep_delay":5}`
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn parts(&self) -> &[(String, Value)] {
        &self.parts
    }

    /// Value of the n-th part
    pub fn part(&self, n: usize) -> Option<&Value> {
        self.parts.get(n).map(|(_, v)| v)
    }
}

impl PartialEq for CompositeKey {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

impl Eq for CompositeKey {}

impl Hash for CompositeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoded.hash(state);
    }
}

impl PartialOrd for CompositeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompositeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.encoded.cmp(&other.encoded)
    }
}

/// Output of grouping: a key and the number of records in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub key: AggregationKey,
    pub value: u64,
}

impl Bucket {
    pub fn new(key: impl Into<AggregationKey>, value: u64) -> Self {
        Self { key: key.into(), value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ordering() {
        let mut keys = vec![
            AggregationKey::from("SEA"),
            AggregationKey::from(10.0),
            AggregationKey::Null,
            AggregationKey::from(-3.0),
            AggregationKey::from("PDX"),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                AggregationKey::Null,
                AggregationKey::from(-3.0),
                AggregationKey::from(10.0),
                AggregationKey::from("PDX"),
                AggregationKey::from("SEA"),
            ]
        );
    }

    #[test]
    fn test_composite_encoding_is_stable() {
        let record = Record::from_pairs([("dep_delay", Value::from(5.0)), ("origin", Value::from("SEA"))]);
        let key = AggregationKey::composite(&["origin", "dep_delay"], &record);
        assert_eq!(key.to_string(), r#"{"origin":"SEA","dep_delay":5}"#);

        let again = AggregationKey::composite(&["origin", "dep_delay"], &record);
        assert_eq!(key, again);
        assert_eq!(key.parts().unwrap()[1].1, Value::Number(5.0));
    }

    #[test]
    fn test_nan_groups_with_null() {
        assert_eq!(AggregationKey::from(f64::NAN), AggregationKey::Null);
        assert_eq!(AggregationKey::Null.to_json(), serde_json::Value::Null);
    }
}
