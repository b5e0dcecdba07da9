//! Size limits for documents and batches
//!
//! Limits are checked before a batch touches storage, so a violation rejects
//! the whole batch with `Error::InvalidDocument` and leaves the collection
//! unchanged. Custom limits can be set through `StoreConfig`.

use crate::document::Document;
use crate::error::Error;
use crate::field::validate_field_name_with_limits;
use crate::value::ScalarValue;
use thiserror::Error;

/// Size limits for documents and batches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum documents per insert batch (default: 100,000)
    pub max_batch_size: usize,

    /// Maximum fields per document (default: 1024)
    pub max_fields_per_document: usize,

    /// Maximum field name length in bytes (default: 1024)
    pub max_field_name_bytes: usize,

    /// Maximum Text value length in bytes (default: 16MB)
    pub max_text_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_batch_size: 100_000,
            max_fields_per_document: 1024,
            max_field_name_bytes: 1024,
            max_text_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_batch_size: 10,
            max_fields_per_document: 8,
            max_field_name_bytes: 32,
            max_text_bytes: 64,
        }
    }

    /// Validate the number of documents in a batch
    pub fn validate_batch_len(&self, len: usize) -> Result<(), LimitError> {
        if len > self.max_batch_size {
            return Err(LimitError::BatchTooLarge {
                actual: len,
                max: self.max_batch_size,
            });
        }
        Ok(())
    }

    /// Validate one document: field count, every field name, and Text sizes
    pub fn validate_document(&self, doc: &Document) -> Result<(), Error> {
        if doc.len() > self.max_fields_per_document {
            return Err(LimitError::TooManyFields {
                actual: doc.len(),
                max: self.max_fields_per_document,
            }
            .into());
        }

        for (name, value) in doc.iter() {
            validate_field_name_with_limits(name, self)?;
            if let ScalarValue::Text(s) = value {
                if s.len() > self.max_text_bytes {
                    return Err(LimitError::TextTooLong {
                        field: name.to_string(),
                        actual: s.len(),
                        max: self.max_text_bytes,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Limit validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LimitError {
    /// Batch holds more documents than allowed
    #[error("Batch too large: {actual} documents exceeds maximum {max}")]
    BatchTooLarge {
        /// Documents in the batch
        actual: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Document holds more fields than allowed
    #[error("Too many fields: {actual} exceeds maximum {max}")]
    TooManyFields {
        /// Fields in the document
        actual: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Text value exceeds maximum length
    #[error("Text in field '{field}' too long: {actual} bytes exceeds maximum {max}")]
    TextTooLong {
        /// Field holding the value
        field: String,
        /// Actual length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}
