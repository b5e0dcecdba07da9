//! Field name validation
//!
//! Rules applied to every field of every document before it is stored:
//! - Field names must be valid UTF-8 (guaranteed by Rust's `&str`)
//! - Field names must not be empty
//! - Field names must not contain NUL bytes (\0)
//! - Field names must not start with the operator prefix `$`
//! - Field names must not exceed `max_field_name_bytes` (default: 1024)
//!
//! Dots carry no meaning: `"a.b"` is a single top-level field.

use crate::limits::Limits;
use thiserror::Error;

/// Prefix reserved for query operators
pub const RESERVED_PREFIX: char = '$';

/// Validate a field name using default limits
///
/// ```
/// use docstore_core::field::validate_field_name;
///
/// assert!(validate_field_name("value").is_ok());
/// assert!(validate_field_name("_id").is_ok());
/// assert!(validate_field_name("a.b").is_ok());
///
/// assert!(validate_field_name("").is_err());
/// assert!(validate_field_name("a\x00b").is_err());
/// assert!(validate_field_name("$set").is_err());
/// ```
pub fn validate_field_name(name: &str) -> Result<(), FieldNameError> {
    validate_field_name_with_limits(name, &Limits::default())
}

/// Validate a field name with custom limits
pub fn validate_field_name_with_limits(name: &str, limits: &Limits) -> Result<(), FieldNameError> {
    if name.is_empty() {
        return Err(FieldNameError::Empty);
    }

    if name.contains('\x00') {
        return Err(FieldNameError::ContainsNul {
            name: name.replace('\x00', "\\0"),
        });
    }

    if name.starts_with(RESERVED_PREFIX) {
        return Err(FieldNameError::ReservedPrefix {
            name: name.to_string(),
        });
    }

    let len = name.len();
    if len > limits.max_field_name_bytes {
        return Err(FieldNameError::TooLong {
            actual: len,
            max: limits.max_field_name_bytes,
        });
    }

    Ok(())
}

/// Field name validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldNameError {
    /// Field name is empty
    #[error("Field name cannot be empty")]
    Empty,

    /// Field name contains a NUL byte
    #[error("Field name '{name}' contains a NUL byte")]
    ContainsNul {
        /// Offending name with NULs escaped
        name: String,
    },

    /// Field name starts with `$`
    #[error("Field name '{name}' cannot start with '{}'", RESERVED_PREFIX)]
    ReservedPrefix {
        /// Offending name
        name: String,
    },

    /// Field name exceeds maximum length
    #[error("Field name too long: {actual} bytes exceeds maximum {max}")]
    TooLong {
        /// Actual length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}
