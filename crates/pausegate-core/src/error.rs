//! Error types for the approval engine and compaction policy

use thiserror::Error;

use crate::models::{ActionId, ResumeToken};

/// Errors raised while evaluating an auto-approval predicate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredicateError {
    #[error("parameter `{0}` is missing")]
    MissingField(String),

    #[error("parameter `{field}` is not numeric: {value}")]
    NotNumeric { field: String, value: String },

    #[error("{0}")]
    Custom(String),
}

impl PredicateError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Pausegate error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Predicate evaluation failed: {0}")]
    PredicateEvaluation(#[from] PredicateError),

    #[error("Unknown resume token: {0}")]
    UnknownToken(ResumeToken),

    #[error(
        "Invalid compaction config: overlap_size ({overlap_size}) must be positive and below compaction_interval ({compaction_interval})"
    )]
    InvalidCompactionConfig {
        compaction_interval: usize,
        overlap_size: usize,
    },

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Duplicate resume token: {0}")]
    DuplicateToken(ResumeToken),

    #[error("Action already awaiting approval: {0}")]
    DuplicateAction(ActionId),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error means "there is nothing to resume for this token".
    pub fn is_unknown_token(&self) -> bool {
        matches!(self, Error::UnknownToken(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

/// Result type alias for pausegate operations
pub type Result<T> = std::result::Result<T, Error>;
