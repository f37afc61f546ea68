//! Error type shared by every stage of the tab pipeline.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TabError {
    /// Input data is structurally incomplete (missing tuning, time signature, string or fret).
    #[error("invalid track data: {0}")]
    Validation(String),

    /// Rational-time arithmetic left the representable range.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// The sequence detector produced candidates that do not cover every input position.
    /// This is an internal consistency defect, never caused by user input.
    #[error("no sequence found for input offset {offset}")]
    UnmatchedOffset { offset: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TabError>;
