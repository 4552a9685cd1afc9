//! Query response decoding for the visualization platform

pub mod config;
pub mod decode;
pub mod schema;
pub mod wire;

use thiserror::Error;

// Re-exports
pub use config::{DatetimeZone, DecodeConfig};
pub use decode::{decode, decode_response, decode_value, SchemaTypeDecoder};
pub use schema::{actual_column_name, ColumnNameResolver};
pub use wire::{parse_response, Cell, Response, Row};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),
}
