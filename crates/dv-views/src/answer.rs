//! Answer model handed from the recommendation step to the renderer

use std::fmt;
use serde::{Serialize, Deserialize};
use dv_core::{Record, Schema};

use crate::ViewError;

/// A value the producer may send either bare or as a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Normalize into a list
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany::Many(items)
    }
}

/// A presentation mode proposed for an answer. Tags match exactly, so
/// `"Chart"` is an unknown mode rather than a chart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CandidateView {
    Chart,
    Table,
    /// A mode no renderer supports
    Other(String),
}

impl From<String> for CandidateView {
    fn from(view: String) -> Self {
        match view.as_str() {
            "chart" => CandidateView::Chart,
            "table" => CandidateView::Table,
            _ => CandidateView::Other(view),
        }
    }
}

impl From<CandidateView> for String {
    fn from(view: CandidateView) -> Self {
        view.to_string()
    }
}

impl fmt::Display for CandidateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateView::Chart => f.write_str("chart"),
            CandidateView::Table => f.write_str("table"),
            CandidateView::Other(view) => f.write_str(view),
        }
    }
}

/// Kind of chart a recommendation may ask for, by exact lowercase tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartKind {
    Bar,
    Line,
    Funnel,
    Column,
    /// Pie, scatter, area and anything else
    Other(String),
}

impl From<String> for ChartKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "bar" => ChartKind::Bar,
            "line" => ChartKind::Line,
            "funnel" => ChartKind::Funnel,
            "column" => ChartKind::Column,
            _ => ChartKind::Other(kind),
        }
    }
}

impl From<ChartKind> for String {
    fn from(kind: ChartKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Bar => f.write_str("bar"),
            ChartKind::Line => f.write_str("line"),
            ChartKind::Funnel => f.write_str("funnel"),
            ChartKind::Column => f.write_str("column"),
            ChartKind::Other(kind) => f.write_str(kind),
        }
    }
}

/// Chart configuration. Axis fields hold column names, which are the
/// actual schema names once the answer has been validated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_types: Option<OneOrMany<ChartKind>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_axis: Option<String>,
}

impl ChartConfig {
    /// Supported chart kinds as a slice, empty when unset
    pub fn supported_types(&self) -> &[ChartKind] {
        self.supported_types.as_ref().map(OneOrMany::as_slice).unwrap_or(&[])
    }

    /// Y axis columns as a slice, empty when unset
    pub fn y_axis(&self) -> &[String] {
        self.y_axis.as_ref().map(OneOrMany::as_slice).unwrap_or(&[])
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Everything known about one generated answer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerContext {
    #[serde(default)]
    pub sql: String,

    #[serde(default)]
    pub candidate_views: OneOrMany<CandidateView>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_config: Option<ChartConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_columns: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Record>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    /// Trust the candidate views without checking them against data
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_data: bool,
}

impl AnswerContext {
    /// Parse an answer from JSON text
    pub fn from_json(text: &str) -> Result<Self, ViewError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Attach decoded data and the schema it was decoded against
    pub fn with_data(mut self, data: Vec<Record>, schema: Schema) -> Self {
        self.data = Some(data);
        self.schema = Some(schema);
        self
    }

    /// Candidate views as a slice
    pub fn candidate_views(&self) -> &[CandidateView] {
        self.candidate_views.as_slice()
    }
}
