//! Shared test utilities for the integration test suites.
//!
//! Import via `mod common;` from any test file.

#![allow(dead_code)]

use docstore::{Document, DocumentStore, ObjectId, ScalarKind, ScalarValue, Timestamp, UniqueId};
use std::sync::Once;
use std::time::Duration;

pub const MIXED_TYPES: &str = "mixed_types";

static INIT_TRACING: Once = Once::new();

/// Install a test subscriber once per process. Honors `RUST_LOG`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// One `(_id, value)` pair per scalar kind, with both sides of the same kind
pub struct SeedRow {
    pub kind: ScalarKind,
    pub id: ScalarValue,
    pub value: ScalarValue,
}

/// The eight seed rows: ObjectId, Text, Int32, Int64, Float64, Boolean,
/// Timestamp, UniqueId
pub fn seed_rows() -> Vec<SeedRow> {
    let now = Timestamp::now();
    vec![
        SeedRow {
            kind: ScalarKind::ObjectId,
            id: ObjectId::new().into(),
            value: ObjectId::new().into(),
        },
        SeedRow {
            kind: ScalarKind::Text,
            id: "string_id".into(),
            value: "string_value".into(),
        },
        SeedRow {
            kind: ScalarKind::Int32,
            id: 123i32.into(),
            value: 456i32.into(),
        },
        SeedRow {
            kind: ScalarKind::Int64,
            id: 1_234_567_890_123i64.into(),
            value: 9_876_543_210_987i64.into(),
        },
        SeedRow {
            kind: ScalarKind::Float64,
            id: 3.14159f64.into(),
            value: 2.71828f64.into(),
        },
        SeedRow {
            kind: ScalarKind::Boolean,
            id: true.into(),
            value: false.into(),
        },
        SeedRow {
            kind: ScalarKind::Timestamp,
            id: now.into(),
            value: now.saturating_add(Duration::from_secs(60)).into(),
        },
        SeedRow {
            kind: ScalarKind::UniqueId,
            id: UniqueId::new_v4().into(),
            value: UniqueId::new_v4().into(),
        },
    ]
}

/// Build the seed documents: `{ _id, value }` per row
pub fn seed_documents(rows: &[SeedRow]) -> Vec<Document> {
    rows.iter()
        .map(|row| Document::with_id(&row.id).append("value", &row.value))
        .collect()
}

/// A fresh store holding the seed collection
pub fn seeded_store() -> (DocumentStore, Vec<SeedRow>) {
    init_tracing();
    let store = DocumentStore::new();
    let rows = seed_rows();
    store.drop_collection(MIXED_TYPES);
    store
        .insert(MIXED_TYPES, seed_documents(&rows))
        .expect("seed insert");
    (store, rows)
}
