//! Decoded cell values and records

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A decoded row: column name to value, in schema order
pub type Record = IndexMap<String, Value>;

/// A typed cell value produced by the decoder.
///
/// `Float` is used for `FLOAT`, `NUMERIC` and `BIGNUMERIC` columns, so
/// decimal columns wider than an `f64` mantissa lose precision. Callers that
/// need exact decimals must read the raw response instead.
///
/// JSON has no literal for infinity, so a non-finite `Float` serializes as
/// `null`; use [`Value::as_f64`] to tell it apart from a real `Null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Text, including opaque `TIME`, `BYTES`, `GEOGRAPHY` and `RANGE`
    /// cells which need a specialized decoder to interpret
    String(String),
    /// Calendar instant in UTC, from `DATE`, `DATETIME` and `TIMESTAMP`
    DateTime(DateTime<Utc>),
    /// Parsed `JSON` column
    Json(serde_json::Value),
    Array(Vec<Value>),
    Struct(Record),
    /// Raw wire value passed through without decoding, because its shape or
    /// type was not one the decoder understands
    Unparsed(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value came through without being decoded
    pub fn is_unparsed(&self) -> bool {
        matches!(self, Value::Unparsed(_))
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Short name of the variant, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Json(_) => "json",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Unparsed(_) => "unparsed",
        }
    }
}

/// Rehydrate a previously serialized record value. Timestamps come back as
/// strings since the JSON form no longer carries the column type.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Struct(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
