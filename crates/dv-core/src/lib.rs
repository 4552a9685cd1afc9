//! Core data model for the answer decoding pipeline
//!
//! This crate provides the schema and value types shared by the decoder
//! and the view validator.

pub mod schema;
pub mod value;

// Re-export commonly used types
pub use schema::{FieldMode, FieldSchema, ScalarType, Schema};
pub use value::{Record, Value};
