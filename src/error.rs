//! Error types for the overlay and review loop
//!
//! Transport and protocol failures come from the annotation service and are
//! safe to retry. Input errors are contract violations by the caller (wrong
//! session state, unknown judgment control) and should fail loudly.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReviewError>;

/// Main error type for the review loop
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid input: {0}")]
    Input(String),
}

impl ReviewError {
    /// Whether re-issuing the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Protocol(_))
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(format!("malformed payload: {}", err))
    }
}

/// Violations of the sorted, non-overlapping span layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("annotation {index} is empty or reversed ({start}..{end})")]
    EmptySpan {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("annotation {index} ends at {end}, past the text length {len}")]
    OutOfBounds { index: usize, end: usize, len: usize },

    #[error("annotation {index} starts at {start}, before the previous end {previous_end}")]
    Overlap {
        index: usize,
        start: usize,
        previous_end: usize,
    },
}
