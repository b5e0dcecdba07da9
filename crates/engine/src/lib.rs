//! Document store engine for docstore
//!
//! This crate builds the store on top of `docstore-core`:
//! - DocumentStore: named collections, atomic batch insert, upsert, drop
//! - Collection: documents, primary-key set and field indexes under one lock
//! - FieldIndex: per-field equality index from canonical key to slots
//! - StoreConfig: `docstore.toml` configuration
//! - StoreMetrics: relaxed operation counters
//!
//! Logging goes through `tracing` under the targets `docstore::store` and
//! `docstore::index`. No subscriber is installed here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod config;
pub mod index;
pub mod metrics;
pub mod store;

pub use collection::{Collection, SaveOutcome};
pub use config::{StoreConfig, CONFIG_FILE_NAME};
pub use index::FieldIndex;
pub use metrics::{MetricsSnapshot, StoreMetrics};
pub use store::DocumentStore;
