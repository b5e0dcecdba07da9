//! Error types for the document store
//!
//! A single error enum is shared by the value model and the engine.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::value::ScalarKind;
use thiserror::Error;

/// Result type alias for docstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the document store
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input to a parsing constructor
    #[error("Invalid {kind} '{input}': {reason}")]
    Format {
        /// Kind being parsed
        kind: ScalarKind,
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// A primary key collided with an existing document or an earlier
    /// document of the same batch. The whole batch was rejected.
    #[error("Duplicate key in collection '{collection}': _id {key} (batch position {position})")]
    DuplicateKey {
        /// Collection the batch targeted
        collection: String,
        /// Debug rendering of the colliding key
        key: String,
        /// Position of the offending document in its batch
        position: usize,
    },

    /// Document rejected before reaching storage
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Configuration could not be read, parsed, or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal state divergence. Always a bug.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Build a `Format` error
    pub fn format(kind: ScalarKind, input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Format {
            kind,
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the caller can fix the input and retry
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::InvariantViolation(_))
    }

    /// Returns true for primary-key collisions
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::DuplicateKey { .. })
    }
}

impl From<crate::limits::LimitError> for Error {
    fn from(e: crate::limits::LimitError) -> Self {
        Error::InvalidDocument(e.to_string())
    }
}

impl From<crate::field::FieldNameError> for Error {
    fn from(e: crate::field::FieldNameError) -> Self {
        Error::InvalidDocument(e.to_string())
    }
}
