//! Backend error types

use serde_json::{json, Value};

/// Rejected selection-update request
///
/// Every variant maps to a stable wire code and HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Body is not a JSON object
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),

    /// `node_id` missing or empty
    #[error("node_id is required")]
    MissingNodeId,

    /// `selection` present but not an array
    #[error("selection must be a list")]
    SelectionMustBeList,

    /// `selection` holds something that is not an integer
    #[error("selection contains a non-integer value")]
    SelectionContainsNonInt,
}

impl RequestError {
    /// Stable wire code
    #[inline]
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "invalid_json",
            Self::MissingNodeId => "missing_node_id",
            Self::SelectionMustBeList => "selection_must_be_list",
            Self::SelectionContainsNonInt => "selection_contains_non_int",
        }
    }

    /// HTTP status to answer with
    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        400
    }

    /// Response body `{ "error": code }`
    #[must_use]
    pub fn body(&self) -> Value {
        json!({ "error": self.code() })
    }
}

/// Node execution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Sample buffer does not match the declared shape
    #[error("batch shape {shape:?} needs {expected} samples, got {actual}")]
    ShapeMismatch {
        /// Declared `[batch, height, width, channels]`
        shape: [usize; 4],
        /// Samples the shape implies
        expected: usize,
        /// Samples provided
        actual: usize,
    },

    /// A preview could not be encoded
    #[error("preview encoding failed for image {index}: {reason}")]
    PreviewEncoding {
        /// Batch index
        index: usize,
        /// Encoder message
        reason: String,
    },
}
