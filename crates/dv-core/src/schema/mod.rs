//! Column schema model for tabular query results
//!
//! Mirrors the `schema.fields` tree of an analytics REST response: every
//! field has a name, a type tag and a cardinality mode, and struct/record
//! fields carry their own nested field list.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Type tag of a result column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScalarType {
    String,
    Integer,
    Float,
    Numeric,
    BigNumeric,
    Boolean,
    Timestamp,
    Date,
    DateTime,
    Time,
    Bytes,
    Geography,
    Range,
    Json,
    Struct,
    Record,
    /// Any tag this crate does not know how to decode
    Unknown(String),
}

impl ScalarType {
    /// Parse a wire type tag. Matching is case-insensitive and accepts the
    /// standard SQL aliases (`INT64`, `FLOAT64`, `BOOL`).
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "STRING" => ScalarType::String,
            "INTEGER" | "INT64" => ScalarType::Integer,
            "FLOAT" | "FLOAT64" => ScalarType::Float,
            "NUMERIC" => ScalarType::Numeric,
            "BIGNUMERIC" => ScalarType::BigNumeric,
            "BOOLEAN" | "BOOL" => ScalarType::Boolean,
            "TIMESTAMP" => ScalarType::Timestamp,
            "DATE" => ScalarType::Date,
            "DATETIME" => ScalarType::DateTime,
            "TIME" => ScalarType::Time,
            "BYTES" => ScalarType::Bytes,
            "GEOGRAPHY" => ScalarType::Geography,
            "RANGE" => ScalarType::Range,
            "JSON" => ScalarType::Json,
            "STRUCT" => ScalarType::Struct,
            "RECORD" => ScalarType::Record,
            _ => ScalarType::Unknown(tag.to_string()),
        }
    }

    /// Canonical wire tag
    pub fn tag(&self) -> &str {
        match self {
            ScalarType::String => "STRING",
            ScalarType::Integer => "INTEGER",
            ScalarType::Float => "FLOAT",
            ScalarType::Numeric => "NUMERIC",
            ScalarType::BigNumeric => "BIGNUMERIC",
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Timestamp => "TIMESTAMP",
            ScalarType::Date => "DATE",
            ScalarType::DateTime => "DATETIME",
            ScalarType::Time => "TIME",
            ScalarType::Bytes => "BYTES",
            ScalarType::Geography => "GEOGRAPHY",
            ScalarType::Range => "RANGE",
            ScalarType::Json => "JSON",
            ScalarType::Struct => "STRUCT",
            ScalarType::Record => "RECORD",
            ScalarType::Unknown(tag) => tag,
        }
    }

    /// Whether values of this type are nested rows
    pub fn is_nested(&self) -> bool {
        matches!(self, ScalarType::Struct | ScalarType::Record)
    }

    /// Whether values of this type decode to a number
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Integer | ScalarType::Float | ScalarType::Numeric | ScalarType::BigNumeric
        )
    }
}

impl From<String> for ScalarType {
    fn from(tag: String) -> Self {
        ScalarType::from_tag(&tag)
    }
}

impl From<ScalarType> for String {
    fn from(ty: ScalarType) -> Self {
        ty.tag().to_string()
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Cardinality of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

impl From<String> for FieldMode {
    fn from(mode: String) -> Self {
        match mode.to_ascii_uppercase().as_str() {
            "REQUIRED" => FieldMode::Required,
            "REPEATED" => FieldMode::Repeated,
            // Absent or unrecognized modes behave like a single optional value
            _ => FieldMode::Nullable,
        }
    }
}

impl From<FieldMode> for String {
    fn from(mode: FieldMode) -> Self {
        match mode {
            FieldMode::Nullable => "NULLABLE",
            FieldMode::Required => "REQUIRED",
            FieldMode::Repeated => "REPEATED",
        }
        .to_string()
    }
}

/// Description of a single column, possibly with nested children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: ScalarType,

    #[serde(default)]
    pub mode: FieldMode,

    /// Children, populated only for `STRUCT`/`RECORD` fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSchema>,
}

impl FieldSchema {
    /// Create a nullable scalar field
    pub fn new(name: impl Into<String>, field_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: FieldMode::Nullable,
            fields: Vec::new(),
        }
    }

    /// Create a struct field with the given children
    pub fn structure(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            field_type: ScalarType::Struct,
            mode: FieldMode::Nullable,
            fields,
        }
    }

    /// Set the cardinality mode
    pub fn with_mode(mut self, mode: FieldMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.mode == FieldMode::Repeated
    }
}

/// Top-level schema of a result set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self { fields }
    }

    /// Flat list of top-level column names, in schema order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Look up a top-level field by exact name
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
