//! Configuration file for the command-line tool

use std::path::Path;
use anyhow::{Context, Result};
use serde::{Serialize, Deserialize};
use dv_data::DecodeConfig;
use dv_views::ValidatorConfig;

/// Decoder and validator settings, loaded from a JSON file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub decode: DecodeConfig,
    pub validator: ValidatorConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
