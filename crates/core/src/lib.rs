//! Core types for docstore
//!
//! This crate defines the value model shared by the engine and its callers:
//! - ScalarKind / ScalarValue: the eight scalar kinds and their tagged union
//! - CanonicalKey: kind-tagged canonical bytes used for hashing and indexing
//! - ObjectId, UniqueId, Timestamp: the identifier and time kinds
//! - Document: ordered field → value mapping with the reserved `_id` field
//! - Limits / field validation: checks run before a document is stored
//! - Error: the error type for every fallible operation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod document;
pub mod error;
pub mod field;
pub mod limits;
pub mod object_id;
pub mod timestamp;
pub mod unique_id;
pub mod value;

pub use canonical::CanonicalKey;
pub use document::{Document, DOC_ID};
pub use error::{Error, Result};
pub use field::{validate_field_name, validate_field_name_with_limits, FieldNameError};
pub use limits::{LimitError, Limits};
pub use object_id::ObjectId;
pub use timestamp::Timestamp;
pub use unique_id::UniqueId;
pub use value::{ScalarKind, ScalarValue, ValueOrdering};
