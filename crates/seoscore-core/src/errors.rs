//! Error types for the scoring and quality-gate engine.

#[cfg(feature = "python")]
use pyo3::exceptions::{PyKeyError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;

/// Top-level error enum for the seoscore core library.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Invalid input for {item:?}: {reason}")]
    InvalidInput { item: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown quality gate: {0}")]
    UnknownGate(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoringError {
    pub fn invalid(item: impl Into<String>, reason: impl Into<String>) -> Self {
        ScoringError::InvalidInput {
            item: item.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "python")]
impl From<ScoringError> for PyErr {
    fn from(err: ScoringError) -> PyErr {
        match &err {
            ScoringError::UnknownGate(_) => PyKeyError::new_err(err.to_string()),
            ScoringError::InvalidInput { .. } | ScoringError::Config(_) | ScoringError::Json(_) => {
                PyValueError::new_err(err.to_string())
            }
        }
    }
}

pub type ScoringResult<T> = Result<T, ScoringError>;
