//! Wire format errors

use ergo_core::plan::PlanError;
use thiserror::Error;

/// Problems with a single step record
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StepError {
    #[error("both ftp_percent and progressive_range are set")]
    AmbiguousTarget,
    #[error("duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),
    #[error("{0}")]
    Invalid(PlanError),
}

/// Errors decoding or encoding JSON documents
#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("step {index}: {source}")]
    Step {
        index: usize,
        #[source]
        source: StepError,
    },

    #[error("{0}")]
    Plan(PlanError),
}

/// Errors parsing the textual workout notation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotationError {
    #[error("no workout steps found in text")]
    Empty,

    #[error("number out of range in `{0}`")]
    Number(String),

    #[error("step `{text}`: {source}")]
    Step {
        text: String,
        #[source]
        source: StepError,
    },

    #[error("{0}")]
    Plan(PlanError),
}
