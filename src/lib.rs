//! docstore - embeddable document store with typed scalar values
//!
//! Documents are ordered `field → value` maps whose values are drawn from a
//! closed set of eight scalar kinds. Values of different kinds never compare
//! equal, so `Int64(42)` does not match `Float64(42.0)` and `Int32(5)` does
//! not collide with `Int64(5)` as a primary key.
//!
//! # Quick Start
//!
//! ```
//! use docstore::{Document, DocumentStore, ScalarValue};
//!
//! let store = DocumentStore::new();
//! store.insert("mixed_types", vec![
//!     Document::with_id(123i32).append("type", "Integer").append("value", 456i32),
//!     Document::with_id(123i64).append("type", "Long").append("value", 456i64),
//! ])?;
//!
//! let hits = store.find_by_field("mixed_types", "value", 456i64);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].get("type"), Some(&ScalarValue::from("Long")));
//! # Ok::<(), docstore::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `docstore-core`: the value model, documents, limits and the error type
//! - `docstore-engine`: collections, field indexes and the store itself

pub use docstore_core::*;
pub use docstore_engine::*;
