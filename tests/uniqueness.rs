//! Primary-key uniqueness tests
//!
//! A batch containing any colliding key is rejected whole: nothing from it is
//! stored and no index changes.

mod common;

use common::*;
use docstore::{Document, DocumentStore, Error, ScalarValue, UniqueId};

fn doc(id: impl Into<ScalarValue>, tag: &str) -> Document {
    Document::with_id(id).append("tag", tag)
}

#[test]
fn test_same_batch_duplicate_fails_whole_batch() {
    init_tracing();
    let store = DocumentStore::new();
    let err = store
        .insert("c", vec![doc("a", "first"), doc("b", "second"), doc("a", "third")])
        .unwrap_err();

    match err {
        Error::DuplicateKey {
            collection,
            key,
            position,
        } => {
            assert_eq!(collection, "c");
            assert_eq!(key, r#"Text("a")"#);
            assert_eq!(position, 2);
        }
        other => panic!("expected DuplicateKey, got {:?}", other),
    }
    assert_eq!(store.count("c"), 0);
    assert!(store.find_by_field("c", "tag", "second").is_empty());
}

#[test]
fn test_cross_batch_duplicate_leaves_count_unchanged() {
    init_tracing();
    let store = DocumentStore::new();
    store.insert("c", vec![doc(1i64, "x"), doc(2i64, "y")]).unwrap();

    let err = store
        .insert("c", vec![doc(3i64, "new"), doc(2i64, "dup")])
        .unwrap_err();
    assert!(err.is_duplicate_key());
    assert!(err.is_recoverable());

    assert_eq!(store.count("c"), 2);
    assert!(store.find_by_id("c", 3i64).is_none());
    assert!(store.find_by_field("c", "tag", "new").is_empty());
    assert!(store.find_by_field("c", "tag", "dup").is_empty());
    assert!(store.check_integrity("c").is_ok());

    let m = store.metrics();
    assert_eq!(m.batches_committed, 1);
    assert_eq!(m.batches_rejected, 1);
    assert_eq!(m.documents_inserted, 2);
}

#[test]
fn test_numerically_equal_ids_of_different_kinds_coexist() {
    init_tracing();
    let store = DocumentStore::new();
    store
        .insert(
            "c",
            vec![
                doc(1i32, "int"),
                doc(1i64, "long"),
                doc(1.0f64, "double"),
                doc(true, "bool"),
                doc("1", "text"),
            ],
        )
        .unwrap();
    assert_eq!(store.count("c"), 5);

    let tag_of = |id: ScalarValue| {
        store
            .find_by_id("c", id)
            .and_then(|d| d.get("tag").cloned())
    };
    assert_eq!(tag_of(1i32.into()), Some(ScalarValue::from("int")));
    assert_eq!(tag_of(1i64.into()), Some(ScalarValue::from("long")));
    assert_eq!(tag_of(1.0f64.into()), Some(ScalarValue::from("double")));
    assert_eq!(tag_of(true.into()), Some(ScalarValue::from("bool")));
    assert_eq!(tag_of("1".into()), Some(ScalarValue::from("text")));
}

#[test]
fn test_negative_zero_collides_with_zero() {
    init_tracing();
    let store = DocumentStore::new();
    store.insert_one("c", doc(0.0f64, "zero")).unwrap();
    let err = store.insert_one("c", doc(-0.0f64, "neg")).unwrap_err();
    assert!(err.is_duplicate_key());
}

#[test]
fn test_uuid_case_does_not_create_distinct_keys() {
    init_tracing();
    let store = DocumentStore::new();
    let lower = UniqueId::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap();
    let upper = UniqueId::parse_str("123E4567-E89B-12D3-A456-426614174000").unwrap();
    store.insert_one("c", doc(lower, "lower")).unwrap();
    assert!(store.insert_one("c", doc(upper, "upper")).unwrap_err().is_duplicate_key());
}

#[test]
fn test_generated_ids_never_collide() {
    init_tracing();
    let store = DocumentStore::new();
    let batch: Vec<Document> = (0..1_000)
        .map(|i: i32| Document::new().append("n", i))
        .collect();
    let ids = store.insert("c", batch).unwrap();
    assert_eq!(ids.len(), 1_000);
    assert_eq!(store.distinct("c", "_id").len(), 1_000);
}

#[test]
fn test_save_never_duplicates() {
    init_tracing();
    let store = DocumentStore::new();
    for round in 0..5i32 {
        store
            .save("c", Document::with_id("only").append("round", round))
            .unwrap();
    }
    assert_eq!(store.count("c"), 1);
    assert_eq!(
        store.find_by_id("c", "only").and_then(|d| d.get("round").cloned()),
        Some(ScalarValue::Int32(4))
    );
    assert!(store.find_by_field("c", "round", 0i32).is_empty());
}

#[test]
fn test_save_keeps_stored_key_bits() {
    init_tracing();
    let store = DocumentStore::new();
    store.insert_one("c", doc(0.0f64, "positive")).unwrap();

    let saved = store.save("c", doc(-0.0f64, "negative")).unwrap();
    assert!(saved.id().and_then(ScalarValue::as_f64).unwrap().is_sign_positive());

    let stored = store.find_by_id("c", -0.0f64).unwrap();
    assert_eq!(stored.get("tag"), Some(&ScalarValue::from("negative")));
    assert!(stored.id().and_then(ScalarValue::as_f64).unwrap().is_sign_positive());
    assert_eq!(store.count("c"), 1);
    assert!(store.check_integrity("c").is_ok());
}
