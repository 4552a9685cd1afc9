//! Wire shape of a tabular query response
//!
//! Rows are positional: `rows[i].f[j].v` is the raw value of column `j`
//! of `schema.fields`. Struct cells repeat the same `{ "f": [{ "v": .. }] }`
//! shape one level down.

use std::path::Path;
use dv_core::Schema;
use serde::{Serialize, Deserialize};

use crate::DataError;

/// A single positional cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub v: serde_json::Value,
}

impl Cell {
    pub fn new(v: serde_json::Value) -> Self {
        Self { v }
    }
}

/// A positional row of cells
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub f: Vec<Cell>,
}

impl Row {
    /// Build a row from raw cell values
    pub fn from_values(values: impl IntoIterator<Item = serde_json::Value>) -> Self {
        Self {
            f: values.into_iter().map(Cell::new).collect(),
        }
    }

    /// Raw values in column order
    pub fn values(&self) -> impl Iterator<Item = &serde_json::Value> {
        self.f.iter().map(|cell| &cell.v)
    }

    pub fn len(&self) -> usize {
        self.f.len()
    }

    pub fn is_empty(&self) -> bool {
        self.f.is_empty()
    }
}

/// Query response as delivered by the transport layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,

    /// Total row count reported upstream, as a decimal string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_complete: Option<bool>,
}

impl Response {
    /// Parse a response from JSON text
    pub fn from_json(text: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a response stored on disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Rows in this page, empty when the response carried none
    pub fn rows(&self) -> &[Row] {
        self.rows.as_deref().unwrap_or(&[])
    }

    /// Upstream total row count, when present and well formed
    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows.as_deref().and_then(|n| n.parse().ok())
    }

    /// Whether more pages are available upstream
    pub fn has_more_pages(&self) -> bool {
        self.page_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Parse a response from JSON text
pub fn parse_response(text: &str) -> Result<Response, DataError> {
    Response::from_json(text)
}
