//! Multi-threaded store tests
//!
//! The store is shared behind an `Arc`. Batches are applied under the
//! collection write lock, so concurrent readers see all of a batch or none
//! of it, and two writers racing on one key produce exactly one winner.

mod common;

use common::*;
use docstore::{Document, DocumentStore};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_racing_inserts_same_key_one_wins() {
    init_tracing();
    for _ in 0..50 {
        let store = Arc::new(DocumentStore::new());
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|t: i32| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.insert_one("c", Document::with_id("contended").append("writer", t))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let dups = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_duplicate_key()))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(dups, 3);
        assert_eq!(store.count("c"), 1);
    }
}

#[test]
fn test_parallel_inserts_distinct_keys() {
    init_tracing();
    let store = Arc::new(DocumentStore::new());
    let threads = 8;
    let per_thread = 250;

    let handles: Vec<_> = (0..threads)
        .map(|t: i64| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let id = t * 1_000_000 + i;
                    store
                        .insert_one("c", Document::with_id(id).append("thread", t))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.count("c"), (threads * per_thread) as usize);
    for t in 0..threads {
        assert_eq!(store.find_by_field("c", "thread", t).len(), per_thread as usize);
    }
    assert!(store.check_integrity("c").is_ok());
}

#[test]
fn test_readers_never_see_partial_batch() {
    init_tracing();
    let store = Arc::new(DocumentStore::new());
    let batch_size = 20;
    let batches = 100;
    let done = Arc::new(AtomicBool::new(false));
    let torn = Arc::new(AtomicUsize::new(0));

    let writer = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for b in 0..batches {
                let docs: Vec<Document> = (0..batch_size)
                    .map(|i: i32| Document::with_id(b * batch_size + i).append("batch", b))
                    .collect();
                store.insert("c", docs).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            let torn = Arc::clone(&torn);
            thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    if store.count("c") % batch_size as usize != 0 {
                        torn.fetch_add(1, Ordering::Relaxed);
                    }
                    let last = store.find_all("c").len();
                    if last % batch_size as usize != 0 {
                        torn.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(torn.load(Ordering::Relaxed), 0);
    assert_eq!(store.count("c"), (batches * batch_size) as usize);
}

#[test]
fn test_drop_racing_inserts_loses_no_acknowledged_write() {
    init_tracing();
    let store = Arc::new(DocumentStore::new());
    let stop = Arc::new(AtomicBool::new(false));

    let dropper = {
        let store = Arc::clone(&store);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                store.drop_collection("c");
                thread::yield_now();
            }
        })
    };

    // Every acknowledged insert lands in a reachable collection instance,
    // so it is either visible now or was removed by a later drop.
    for i in 0..2_000i32 {
        store.insert_one("c", Document::with_id(i)).unwrap();
    }
    stop.store(true, Ordering::SeqCst);
    dropper.join().unwrap();

    store.insert_one("c", Document::with_id(-1i32)).unwrap();
    assert!(store.find_by_id("c", -1i32).is_some());
    assert!(store.check_integrity("c").is_ok());
}

#[test]
fn test_racing_drops_only_one_removes() {
    init_tracing();
    for _ in 0..200 {
        let store = Arc::new(DocumentStore::new());
        store.insert_one("c", Document::with_id(1i32)).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.drop_collection("c")
                })
            })
            .collect();

        let removed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&r| r)
            .count();
        assert_eq!(removed, 1);
        assert_eq!(store.metrics().collections_dropped, 1);
        assert!(!store.collection_exists("c"));
    }
}

#[test]
fn test_collections_are_independent() {
    init_tracing();
    let store = Arc::new(DocumentStore::new());
    let handles: Vec<_> = (0..4)
        .map(|t: i32| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let name = format!("coll_{}", t);
                for i in 0..100i32 {
                    store.insert_one(&name, Document::with_id(i)).unwrap();
                }
                store.drop_collection(&name);
                store.insert_one(&name, Document::with_id(0i32)).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(store.list_collections().len(), 4);
    for t in 0..4 {
        assert_eq!(store.count(&format!("coll_{}", t)), 1);
    }
}
