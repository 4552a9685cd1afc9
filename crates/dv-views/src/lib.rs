//! View selection for generated answers
//!
//! Decides which presentation views (chart, table) an answer may offer,
//! given the data that was actually decoded for it.

pub mod answer;
pub mod validator;

use thiserror::Error;

pub use answer::{AnswerContext, CandidateView, ChartConfig, ChartKind, OneOrMany};
pub use validator::{normalize_and_validate, ValidatorConfig, ViewCapabilityValidator};

/// Errors that can occur while preparing an answer for rendering
#[derive(Error, Debug)]
pub enum ViewError {
    /// None of the candidate views can be backed by the decoded data
    #[error("could not produce a usable answer")]
    NoRenderableView { rejected: Vec<CandidateView> },

    #[error("Malformed answer: {0}")]
    Malformed(#[from] serde_json::Error),
}
