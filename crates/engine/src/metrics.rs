//! Store-wide operation counters
//!
//! Counters are relaxed atomics: each is individually accurate, but a
//! snapshot taken while writers run is not a consistent cut across them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by a `DocumentStore`
#[derive(Debug, Default)]
pub struct StoreMetrics {
    documents_inserted: AtomicU64,
    documents_replaced: AtomicU64,
    batches_committed: AtomicU64,
    batches_rejected: AtomicU64,
    queries_executed: AtomicU64,
    collections_dropped: AtomicU64,
}

impl StoreMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_batch_committed(&self, documents: usize) {
        self.batches_committed.fetch_add(1, Ordering::Relaxed);
        self.documents_inserted
            .fetch_add(documents as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_batch_rejected(&self) {
        self.batches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_replaced(&self) {
        self.documents_replaced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_drop(&self) {
        self.collections_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_inserted: self.documents_inserted.load(Ordering::Relaxed),
            documents_replaced: self.documents_replaced.load(Ordering::Relaxed),
            batches_committed: self.batches_committed.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            collections_dropped: self.collections_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`StoreMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Documents stored by committed batches and by `save` inserts
    pub documents_inserted: u64,
    /// Documents replaced in place by `save`
    pub documents_replaced: u64,
    /// Insert batches (and `save` calls) that committed
    pub batches_committed: u64,
    /// Insert batches rejected by validation or a duplicate key
    pub batches_rejected: u64,
    /// Read operations served
    pub queries_executed: u64,
    /// Drops that removed an existing collection
    pub collections_dropped: u64,
}

impl MetricsSnapshot {
    /// Batches that reached a decision (committed + rejected)
    pub fn total_batches(&self) -> u64 {
        self.batches_committed + self.batches_rejected
    }

    /// Rejection rate (rejected / total), 0.0 when no batch ran
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_batches();
        if total > 0 {
            self.batches_rejected as f64 / total as f64
        } else {
            0.0
        }
    }
}
