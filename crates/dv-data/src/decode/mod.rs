//! Schema-typed decoding of positional query rows
//!
//! The decoder is lenient: a cell that cannot be decoded becomes
//! [`Value::Null`] instead of failing the whole result set, and rows
//! carrying more cells than the schema has fields are truncated.

pub mod temporal;

use dv_core::{FieldSchema, Record, ScalarType, Schema, Value};
use serde_json::Value as RawValue;
use tracing::{debug, trace};

use crate::config::DecodeConfig;
use crate::wire::{Response, Row};

/// Decoder turning raw response rows into typed records
#[derive(Debug, Clone, Default)]
pub struct SchemaTypeDecoder {
    config: DecodeConfig,
}

impl SchemaTypeDecoder {
    /// Create a decoder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given configuration
    pub fn with_config(mut self, config: DecodeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode a whole response. Returns no records if the response lacks
    /// either a schema or rows.
    pub fn decode_response(&self, response: &Response) -> Vec<Record> {
        match (&response.schema, &response.rows) {
            (Some(schema), Some(rows)) => self.decode(rows, schema),
            _ => {
                debug!("Response has no schema or no rows, nothing to decode");
                Vec::new()
            }
        }
    }

    /// Decode every row against the schema. Output has one record per row,
    /// so an empty field list yields one empty record for each row.
    pub fn decode(&self, rows: &[Row], schema: &Schema) -> Vec<Record> {
        if schema.is_empty() {
            debug!("Empty schema, {} rows decode to empty records", rows.len());
        }

        rows.iter()
            .map(|row| self.decode_positional(row.values(), row.len(), &schema.fields))
            .collect()
    }

    /// Decode a single raw cell against its field schema
    pub fn decode_value(&self, raw: &RawValue, field: &FieldSchema) -> Value {
        if raw.is_null() {
            return Value::Null;
        }

        if !field.is_repeated() {
            return self.decode_single(raw, field);
        }

        match raw {
            RawValue::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.decode_single(unwrap_cell(item), field))
                    .collect(),
            ),
            other => {
                trace!("Repeated field '{}' is not an array, passing through", field.name);
                Value::Unparsed(other.clone())
            }
        }
    }

    /// Pair positional values with fields by index. Missing trailing values
    /// decode as null; surplus values are dropped.
    fn decode_positional<'a>(
        &self,
        mut values: impl Iterator<Item = &'a RawValue>,
        value_count: usize,
        fields: &[FieldSchema],
    ) -> Record {
        if value_count > fields.len() {
            trace!("Dropping {} surplus values", value_count - fields.len());
        }

        let mut record = Record::with_capacity(fields.len());
        for field in fields {
            let value = match values.next() {
                Some(raw) => self.decode_value(raw, field),
                None => Value::Null,
            };
            record.insert(field.name.clone(), value);
        }
        record
    }

    /// Decode one non-repeated value, ignoring the field's mode
    fn decode_single(&self, raw: &RawValue, field: &FieldSchema) -> Value {
        if raw.is_null() {
            return Value::Null;
        }

        match &field.field_type {
            ScalarType::String => self.decode_string(raw, &field.name),
            ScalarType::Integer => decode_integer(raw),
            ScalarType::Float | ScalarType::Numeric | ScalarType::BigNumeric => decode_float(raw),
            ScalarType::Boolean => decode_boolean(raw),
            ScalarType::Timestamp => temporal::parse_timestamp(raw)
                .map(Value::DateTime)
                .unwrap_or(Value::Null),
            ScalarType::Date => raw
                .as_str()
                .and_then(temporal::parse_date)
                .map(Value::DateTime)
                .unwrap_or(Value::Null),
            ScalarType::DateTime => raw
                .as_str()
                .and_then(|s| temporal::parse_datetime(s, self.config.datetime_zone))
                .map(Value::DateTime)
                .unwrap_or(Value::Null),
            ScalarType::Time | ScalarType::Bytes | ScalarType::Geography | ScalarType::Range => {
                decode_opaque(raw)
            }
            ScalarType::Json => decode_json(raw),
            ScalarType::Struct | ScalarType::Record => self.decode_struct(raw, field),
            ScalarType::Unknown(tag) => {
                trace!("Unknown type '{}' on field '{}', passing through", tag, field.name);
                Value::Unparsed(raw.clone())
            }
        }
    }

    fn decode_string(&self, raw: &RawValue, name: &str) -> Value {
        match raw {
            RawValue::String(s) => {
                if self.config.is_date_string_field(name) && temporal::is_compact_date(s) {
                    if let Some(date) = temporal::parse_compact_date(s) {
                        return Value::DateTime(date);
                    }
                    trace!("'{}' in field '{}' is not a calendar date", s, name);
                }
                Value::String(s.clone())
            }
            RawValue::Null => Value::Null,
            other => Value::String(stringify(other)),
        }
    }

    fn decode_struct(&self, raw: &RawValue, field: &FieldSchema) -> Value {
        if field.fields.is_empty() {
            trace!("Struct field '{}' has no nested schema", field.name);
            return Value::Null;
        }

        let Some(cells) = raw.get("f").and_then(RawValue::as_array) else {
            trace!("Struct field '{}' has no positional values", field.name);
            return Value::Null;
        };

        let record =
            self.decode_positional(cells.iter().map(unwrap_cell), cells.len(), &field.fields);
        Value::Struct(record)
    }
}

/// Unwrap a `{ "v": .. }` cell, leaving any other value as is
fn unwrap_cell(item: &RawValue) -> &RawValue {
    match item {
        RawValue::Object(map) if map.len() == 1 => map.get("v").unwrap_or(item),
        _ => item,
    }
}

fn stringify(raw: &RawValue) -> String {
    match raw {
        RawValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse numeric text. Infinities are accepted only in the warehouse's own
/// spelling (`Infinity`, `-Infinity`); `inf`, `nan` and friends are rejected.
fn parse_number(raw: &RawValue) -> Option<f64> {
    let text = raw.as_str()?.trim();
    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if text.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    let n: f64 = text.parse().ok()?;
    (!n.is_nan()).then_some(n)
}

fn decode_integer(raw: &RawValue) -> Value {
    match raw.as_str().map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(i) => Value::Integer(i),
        None => decode_float(raw),
    }
}

fn decode_float(raw: &RawValue) -> Value {
    parse_number(raw).map(Value::Float).unwrap_or(Value::Null)
}

fn decode_boolean(raw: &RawValue) -> Value {
    match raw {
        RawValue::Bool(b) => Value::Bool(*b),
        RawValue::String(s) if s.eq_ignore_ascii_case("true") => Value::Bool(true),
        RawValue::String(s) if s.eq_ignore_ascii_case("false") => Value::Bool(false),
        _ => Value::Null,
    }
}

fn decode_opaque(raw: &RawValue) -> Value {
    match raw {
        RawValue::String(s) => Value::String(s.clone()),
        other => Value::Unparsed(other.clone()),
    }
}

fn decode_json(raw: &RawValue) -> Value {
    match raw {
        RawValue::String(text) => serde_json::from_str(text)
            .map(Value::Json)
            .unwrap_or(Value::Null),
        // Already structured on the wire
        other => Value::Json(other.clone()),
    }
}

/// Decode rows against a schema with the default configuration
pub fn decode(rows: &[Row], schema: &Schema) -> Vec<Record> {
    SchemaTypeDecoder::new().decode(rows, schema)
}

/// Decode a single cell with the default configuration
pub fn decode_value(raw: &RawValue, field: &FieldSchema) -> Value {
    SchemaTypeDecoder::new().decode_value(raw, field)
}

/// Decode a whole response with the given configuration
pub fn decode_response(response: &Response, config: &DecodeConfig) -> Vec<Record> {
    SchemaTypeDecoder::new()
        .with_config(config.clone())
        .decode_response(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dv_core::FieldMode;
    use serde_json::json;

    fn field(name: &str, ty: ScalarType) -> FieldSchema {
        FieldSchema::new(name, ty)
    }

    fn sample_schema() -> Schema {
        Schema::new(vec![
            field("event_date", ScalarType::String),
            field("event_name", ScalarType::String),
            field("users", ScalarType::Integer),
        ])
    }

    #[test]
    fn test_decode_rows() {
        let rows = vec![
            Row::from_values([json!("20250217"), json!("page_view"), json!("42")]),
            Row::from_values([json!("20250218"), json!(null), json!("7")]),
        ];

        let records = decode(&rows, &sample_schema());
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(
            first.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["event_date", "event_name", "users"]
        );
        assert_eq!(
            first["event_date"],
            Value::DateTime(Utc.with_ymd_and_hms(2025, 2, 17, 0, 0, 0).unwrap())
        );
        assert_eq!(first["event_name"], Value::String("page_view".to_string()));
        assert_eq!(first["users"], Value::Integer(42));
        assert_eq!(records[1]["event_name"], Value::Null);
    }

    #[test]
    fn test_surplus_values_are_dropped() {
        let rows = vec![Row::from_values([
            json!("20250217"),
            json!("click"),
            json!("3"),
            json!("extra"),
            json!({ "f": [] }),
        ])];

        let records = decode(&rows, &sample_schema());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 3);
        assert_eq!(records[0]["users"], Value::Integer(3));
    }

    #[test]
    fn test_short_rows_fill_with_null() {
        let rows = vec![Row::from_values([json!("20250217")])];
        let records = decode(&rows, &sample_schema());
        assert_eq!(records[0].len(), 3);
        assert_eq!(records[0]["event_name"], Value::Null);
        assert_eq!(records[0]["users"], Value::Null);
    }

    #[test]
    fn test_empty_inputs() {
        let rows = vec![Row::from_values([json!("1")])];
        assert_eq!(decode(&rows, &Schema::default()).len(), rows.len());
        assert!(decode(&[], &sample_schema()).is_empty());
        assert!(decode_response(&Response::default(), &DecodeConfig::default()).is_empty());
    }

    #[test]
    fn test_empty_schema_keeps_row_count() {
        let rows = vec![Row::from_values([json!("1")]), Row::from_values([])];
        let records = decode(&rows, &Schema::default());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.is_empty()));

        let response = Response {
            schema: Some(Schema::default()),
            rows: Some(rows),
            ..Response::default()
        };
        assert_eq!(decode_response(&response, &DecodeConfig::default()).len(), 2);
    }

    #[test]
    fn test_event_date_rule() {
        let f = field("event_date", ScalarType::String);
        assert_eq!(
            decode_value(&json!("20250217"), &f),
            Value::DateTime(Utc.with_ymd_and_hms(2025, 2, 17, 0, 0, 0).unwrap())
        );
        // Impossible dates stay as text
        assert_eq!(decode_value(&json!("20250230"), &f), Value::String("20250230".to_string()));
        assert_eq!(decode_value(&json!("2025-02-17"), &f), Value::String("2025-02-17".to_string()));

        // Other string columns are never reinterpreted
        let other = field("order_id", ScalarType::String);
        assert_eq!(decode_value(&json!("20250217"), &other), Value::String("20250217".to_string()));
    }

    #[test]
    fn test_configured_date_string_fields() {
        let mut config = DecodeConfig::default();
        config.add_date_string_field("session_day".to_string());
        let decoder = SchemaTypeDecoder::new().with_config(config);

        let value = decoder.decode_value(&json!("20240101"), &field("session_day", ScalarType::String));
        assert!(value.as_datetime().is_some());
    }

    #[test]
    fn test_string_stringifies_non_text() {
        let f = field("label", ScalarType::String);
        assert_eq!(decode_value(&json!(12), &f), Value::String("12".to_string()));
        assert_eq!(decode_value(&json!(true), &f), Value::String("true".to_string()));
    }

    #[test]
    fn test_numeric_types() {
        assert_eq!(decode_value(&json!("-17"), &field("n", ScalarType::Integer)), Value::Integer(-17));
        assert_eq!(decode_value(&json!("1e3"), &field("n", ScalarType::Integer)), Value::Float(1000.0));
        assert_eq!(decode_value(&json!("2.5"), &field("n", ScalarType::Float)), Value::Float(2.5));
        assert_eq!(decode_value(&json!("123.456"), &field("n", ScalarType::Numeric)), Value::Float(123.456));
        assert_eq!(
            decode_value(&json!("Infinity"), &field("n", ScalarType::Float)),
            Value::Float(f64::INFINITY)
        );

        let wide = decode_value(
            &json!("12345678901234567890.123456789"),
            &field("n", ScalarType::BigNumeric),
        );
        assert!(matches!(wide, Value::Float(f) if (f - 1.2345678901234567e19).abs() < 1e4));
    }

    #[test]
    fn test_numeric_failures_are_null() {
        let f = field("n", ScalarType::Float);
        assert_eq!(decode_value(&json!("abc"), &f), Value::Null);
        assert_eq!(decode_value(&json!("NaN"), &f), Value::Null);
        assert_eq!(decode_value(&json!("nan"), &f), Value::Null);
        assert_eq!(decode_value(&json!(""), &f), Value::Null);
        assert_eq!(decode_value(&json!(3), &f), Value::Null);
        assert_eq!(decode_value(&json!("x"), &field("n", ScalarType::Integer)), Value::Null);
    }

    #[test]
    fn test_only_warehouse_infinity_spellings() {
        let f = field("n", ScalarType::Float);
        assert_eq!(decode_value(&json!("-Infinity"), &f), Value::Float(f64::NEG_INFINITY));
        assert_eq!(decode_value(&json!("+Infinity"), &f), Value::Float(f64::INFINITY));
        for text in ["inf", "INF", "-inf", "infinity", "INFINITY", "Inf"] {
            assert_eq!(decode_value(&json!(text), &f), Value::Null, "{}", text);
        }
        assert_eq!(
            decode_value(&json!("inf"), &field("n", ScalarType::Integer)),
            Value::Null
        );
        assert_eq!(decode_value(&json!("-2.5E2"), &f), Value::Float(-250.0));
    }

    #[test]
    fn test_boolean() {
        let f = field("b", ScalarType::Boolean);
        assert_eq!(decode_value(&json!(true), &f), Value::Bool(true));
        assert_eq!(decode_value(&json!("TRUE"), &f), Value::Bool(true));
        assert_eq!(decode_value(&json!("False"), &f), Value::Bool(false));
        assert_eq!(decode_value(&json!("yes"), &f), Value::Null);
        assert_eq!(decode_value(&json!(1), &f), Value::Null);
    }

    #[test]
    fn test_date_type() {
        let f = field("d", ScalarType::Date);
        assert_eq!(decode_value(&json!("20250230"), &f), Value::Null);
        assert_eq!(
            decode_value(&json!("20250217"), &f),
            Value::DateTime(Utc.with_ymd_and_hms(2025, 2, 17, 0, 0, 0).unwrap())
        );
        assert_eq!(
            decode_value(&json!("2025-02-17"), &f),
            Value::DateTime(Utc.with_ymd_and_hms(2025, 2, 17, 0, 0, 0).unwrap())
        );
        assert_eq!(decode_value(&json!("Feb 17"), &f), Value::Null);
    }

    #[test]
    fn test_timestamp_and_datetime_types() {
        let ts = decode_value(&json!("1.7397504E9"), &field("t", ScalarType::Timestamp));
        assert_eq!(ts, Value::DateTime(Utc.with_ymd_and_hms(2025, 2, 17, 0, 0, 0).unwrap()));
        assert_eq!(decode_value(&json!("later"), &field("t", ScalarType::Timestamp)), Value::Null);

        let dt = decode_value(&json!("2025-02-17 08:30:00"), &field("t", ScalarType::DateTime));
        assert_eq!(dt, Value::DateTime(Utc.with_ymd_and_hms(2025, 2, 17, 8, 30, 0).unwrap()));
    }

    #[test]
    fn test_opaque_types_stay_text() {
        for ty in [ScalarType::Time, ScalarType::Bytes, ScalarType::Geography, ScalarType::Range] {
            assert_eq!(
                decode_value(&json!("opaque"), &field("o", ty)),
                Value::String("opaque".to_string())
            );
        }
    }

    #[test]
    fn test_json_type() {
        let f = field("payload", ScalarType::Json);
        assert_eq!(decode_value(&json!(r#"{"a":[1,2]}"#), &f), Value::Json(json!({ "a": [1, 2] })));
        assert_eq!(decode_value(&json!("{broken"), &f), Value::Null);
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let f = field("x", ScalarType::Unknown("INTERVAL".to_string()));
        let value = decode_value(&json!("0-0 1 0:0:0"), &f);
        assert_eq!(value, Value::Unparsed(json!("0-0 1 0:0:0")));
    }

    #[test]
    fn test_repeated_integer() {
        let f = field("ids", ScalarType::Integer).with_mode(FieldMode::Repeated);
        assert_eq!(
            decode_value(&json!(["1", "2", "3"]), &f),
            Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
        // Cell-wrapped elements decode the same way
        assert_eq!(
            decode_value(&json!([{ "v": "4" }, { "v": null }]), &f),
            Value::Array(vec![Value::Integer(4), Value::Null])
        );
    }

    #[test]
    fn test_repeated_non_array_passes_through() {
        let f = field("ids", ScalarType::Integer).with_mode(FieldMode::Repeated);
        assert_eq!(decode_value(&json!("1"), &f), Value::Unparsed(json!("1")));
    }

    #[test]
    fn test_struct() {
        let f = FieldSchema::structure(
            "traffic_source",
            vec![field("source", ScalarType::String), field("hits", ScalarType::Integer)],
        );

        let value = decode_value(
            &json!({ "f": [{ "v": "google" }, { "v": "12" }, { "v": "surplus" }] }),
            &f,
        );
        let Value::Struct(record) = value else {
            panic!("expected struct");
        };
        assert_eq!(record.len(), 2);
        assert_eq!(record["source"], Value::String("google".to_string()));
        assert_eq!(record["hits"], Value::Integer(12));
    }

    #[test]
    fn test_struct_shape_mismatch_is_null() {
        let f = FieldSchema::structure("s", vec![field("a", ScalarType::String)]);
        assert_eq!(decode_value(&json!("not a struct"), &f), Value::Null);
        assert_eq!(decode_value(&json!({ "x": 1 }), &f), Value::Null);

        let childless = FieldSchema::structure("s", Vec::new());
        assert_eq!(decode_value(&json!({ "f": [{ "v": "a" }] }), &childless), Value::Null);
    }

    #[test]
    fn test_repeated_struct_of_repeated() {
        let f = FieldSchema::structure(
            "items",
            vec![
                field("sku", ScalarType::String),
                field("qty", ScalarType::Integer).with_mode(FieldMode::Repeated),
            ],
        )
        .with_mode(FieldMode::Repeated);

        let raw = json!([
            { "v": { "f": [{ "v": "A1" }, { "v": [{ "v": "1" }, { "v": "2" }] }] } },
            { "v": { "f": [{ "v": "B2" }, { "v": [] }] } }
        ]);

        let Value::Array(items) = decode_value(&raw, &f) else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 2);
        let Value::Struct(first) = &items[0] else {
            panic!("expected struct");
        };
        assert_eq!(first["sku"], Value::String("A1".to_string()));
        assert_eq!(first["qty"], Value::Array(vec![Value::Integer(1), Value::Integer(2)]));
        let Value::Struct(second) = &items[1] else {
            panic!("expected struct");
        };
        assert_eq!(second["qty"], Value::Array(Vec::new()));
    }

    #[test]
    fn test_decode_response() {
        let response = Response::from_json(
            r#"{
                "schema": { "fields": [
                    { "name": "source", "type": "STRING", "mode": "NULLABLE" },
                    { "name": "sessions", "type": "INTEGER", "mode": "NULLABLE" }
                ]},
                "rows": [
                    { "f": [{ "v": "google" }, { "v": "10" }] },
                    { "f": [{ "v": "direct" }, { "v": "bogus" }] }
                ]
            }"#,
        )
        .unwrap();

        let records = decode_response(&response, &DecodeConfig::default());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["sessions"], Value::Integer(10));
        assert_eq!(records[1]["sessions"], Value::Null);
    }
}
