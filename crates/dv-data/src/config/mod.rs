//! Decoder configuration

use serde::{Serialize, Deserialize};

/// How wall-clock `DATETIME` values are anchored to an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatetimeZone {
    /// Read the wall-clock value as UTC
    #[default]
    Utc,
    /// Read the wall-clock value in the host's local timezone
    Local,
}

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// `STRING` columns whose `YYYYMMDD` values decode as dates
    pub date_string_fields: Vec<String>,

    /// Anchoring for `DATETIME` columns
    pub datetime_zone: DatetimeZone,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            date_string_fields: vec!["event_date".to_string()],
            datetime_zone: DatetimeZone::Utc,
        }
    }
}

impl DecodeConfig {
    /// Check if a `STRING` column holds compact dates
    pub fn is_date_string_field(&self, name: &str) -> bool {
        self.date_string_fields.iter().any(|f| f == name)
    }

    /// Add a date string column
    pub fn add_date_string_field(&mut self, name: String) {
        if !self.date_string_fields.contains(&name) {
            self.date_string_fields.push(name);
        }
    }

    /// Set the `DATETIME` anchoring
    pub fn with_datetime_zone(mut self, zone: DatetimeZone) -> Self {
        self.datetime_zone = zone;
        self
    }
}
