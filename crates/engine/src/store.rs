//! The document store
//!
//! `DocumentStore` maps collection names to collections. It is `Send + Sync`
//! and meant to be shared behind an `Arc`; every operation is synchronous.
//!
//! ## Concurrency
//!
//! - The name → collection map is a `DashMap`, so operations on different
//!   collections never contend on a common lock.
//! - Each collection has its own `RwLock` (see [`Collection`]).
//! - Dropping a collection marks the instance dropped under its write lock
//!   and only then unlinks it. A writer that reached the dropped instance
//!   retries against the map, which yields a fresh instance.
//!
//! ## Reads never fail
//!
//! An absent collection, an unknown field or a value of another kind all
//! produce an empty result, never an error.

use dashmap::DashMap;
use docstore_core::{Document, Error, Limits, ObjectId, Result, ScalarValue, DOC_ID};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::collection::{Collection, SaveOutcome};
use crate::config::StoreConfig;
use crate::metrics::{MetricsSnapshot, StoreMetrics};

/// An in-memory document store with per-field equality indexes
#[derive(Debug)]
pub struct DocumentStore {
    collections: DashMap<String, Arc<Collection>>,
    config: StoreConfig,
    limits: Limits,
    metrics: StoreMetrics,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create a store with the default configuration
    pub fn new() -> Self {
        let config = StoreConfig::default();
        DocumentStore {
            collections: DashMap::new(),
            limits: config.limits(),
            config,
            metrics: StoreMetrics::new(),
        }
    }

    /// Create a store with a custom configuration
    ///
    /// # Errors
    /// `Error::Config` if any limit is zero.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(DocumentStore {
            collections: DashMap::new(),
            limits: config.limits(),
            config,
            metrics: StoreMetrics::new(),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Snapshot of the store counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // =========================================================================
    // Collection lifecycle
    // =========================================================================

    /// Create a collection if it does not exist
    ///
    /// Returns true if a new collection was created.
    pub fn create_collection(&self, name: &str) -> bool {
        let mut created = false;
        self.collections.entry(name.to_string()).or_insert_with(|| {
            created = true;
            info!(target: "docstore::store", collection = name, "Collection created");
            Arc::new(Collection::new(name))
        });
        created
    }

    /// Returns true if the collection exists
    pub fn collection_exists(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Names of every existing collection, sorted
    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Drop a collection with all its documents and indexes
    ///
    /// Idempotent: dropping an absent collection is a no-op. Returns true if
    /// this call removed a collection; of two racing drops only one does.
    pub fn drop_collection(&self, name: &str) -> bool {
        let Some(collection) = self.lookup(name) else {
            return false;
        };
        let Some(removed) = collection.mark_dropped() else {
            return false;
        };
        self.collections
            .remove_if(name, |_, current| Arc::ptr_eq(current, &collection));
        self.metrics.record_drop();
        info!(target: "docstore::store", collection = name, documents = removed, "Collection dropped");
        true
    }

    fn lookup(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.get(name).map(|entry| Arc::clone(entry.value()))
    }

    fn lookup_or_create(&self, name: &str) -> Arc<Collection> {
        if let Some(collection) = self.lookup(name) {
            return collection;
        }
        let entry = self.collections.entry(name.to_string()).or_insert_with(|| {
            info!(target: "docstore::store", collection = name, "Collection created");
            Arc::new(Collection::new(name))
        });
        Arc::clone(entry.value())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a batch of documents atomically
    ///
    /// Documents without `_id` get a fresh `ObjectId` when
    /// `auto_generate_ids` is enabled. Returns the primary keys in batch order.
    ///
    /// # Errors
    /// - `Error::InvalidDocument` if a document fails validation, or lacks
    ///   `_id` while id generation is disabled
    /// - `Error::DuplicateKey` if a key collides with a stored document or an
    ///   earlier document of the same batch
    ///
    /// On error nothing from the batch is stored.
    pub fn insert(
        &self,
        collection: &str,
        documents: impl IntoIterator<Item = Document>,
    ) -> Result<Vec<ScalarValue>> {
        let result = self.insert_inner(collection, documents.into_iter().collect());
        match &result {
            Ok(ids) => {
                self.metrics.record_batch_committed(ids.len());
                debug!(target: "docstore::store", collection, batch = ids.len(), "Insert batch committed");
            }
            Err(Error::DuplicateKey { key, position, .. }) => {
                self.metrics.record_batch_rejected();
                warn!(target: "docstore::store", collection, key = %key, position, "Insert batch rejected: duplicate key");
            }
            Err(e) => {
                self.metrics.record_batch_rejected();
                debug!(target: "docstore::store", collection, error = %e, "Insert batch rejected");
            }
        }
        result
    }

    fn insert_inner(&self, collection: &str, documents: Vec<Document>) -> Result<Vec<ScalarValue>> {
        self.limits.validate_batch_len(documents.len())?;
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let documents = documents
            .into_iter()
            .enumerate()
            .map(|(position, doc)| {
                self.prepare(doc).map_err(|e| match e {
                    Error::InvalidDocument(msg) => {
                        Error::InvalidDocument(format!("batch position {}: {}", position, msg))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        loop {
            let target = self.lookup_or_create(collection);
            if let Some(mut active) = target.write_active() {
                return active.insert_batch(documents);
            }
            // Raced with a drop; the next lookup sees a fresh instance
            std::thread::yield_now();
        }
    }

    /// Insert a single document; returns its primary key
    pub fn insert_one(&self, collection: &str, document: Document) -> Result<ScalarValue> {
        let mut ids = self.insert(collection, std::iter::once(document))?;
        ids.pop().ok_or_else(|| {
            Error::InvariantViolation("single-document insert returned no key".to_string())
        })
    }

    /// Insert, or replace the document with the same `_id`
    ///
    /// A replaced document keeps its position in insertion order. Returns
    /// the stored document, including a generated `_id` if one was assigned.
    pub fn save(&self, collection: &str, document: Document) -> Result<Document> {
        let mut document = match self.prepare(document) {
            Ok(doc) => doc,
            Err(e) => {
                self.metrics.record_batch_rejected();
                return Err(e);
            }
        };

        let outcome = loop {
            let target = self.lookup_or_create(collection);
            if let Some(mut active) = target.write_active() {
                break active.save(&mut document)?;
            }
            std::thread::yield_now();
        };

        match outcome {
            SaveOutcome::Inserted => self.metrics.record_batch_committed(1),
            SaveOutcome::Replaced => self.metrics.record_replaced(),
        }
        debug!(target: "docstore::store", collection, outcome = ?outcome, "Document saved");
        Ok(document)
    }

    /// Assign `_id` if missing, then validate against the limits
    fn prepare(&self, document: Document) -> Result<Document> {
        let document = if document.id().is_some() {
            document
        } else if self.config.auto_generate_ids {
            let mut with_id = Document::with_id(ObjectId::new());
            for (field, value) in document {
                with_id.insert(field, value);
            }
            with_id
        } else {
            return Err(Error::InvalidDocument(format!(
                "document has no {} and id generation is disabled",
                DOC_ID
            )));
        };
        self.limits.validate_document(&document)?;
        Ok(document)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Every document whose `field` equals `value`, in insertion order
    pub fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: impl Into<ScalarValue>,
    ) -> Vec<Document> {
        self.metrics.record_query();
        let value = value.into();
        self.lookup(collection)
            .map(|c| c.find_by_field(field, &value))
            .unwrap_or_default()
    }

    /// First document whose `field` equals `value`
    pub fn find_one_by_field(
        &self,
        collection: &str,
        field: &str,
        value: impl Into<ScalarValue>,
    ) -> Option<Document> {
        self.metrics.record_query();
        let value = value.into();
        self.lookup(collection)?.find_one_by_field(field, &value)
    }

    /// Document with primary key `id`
    pub fn find_by_id(&self, collection: &str, id: impl Into<ScalarValue>) -> Option<Document> {
        self.metrics.record_query();
        let id = id.into();
        self.lookup(collection)?.find_by_id(&id)
    }

    /// Every document of a collection in insertion order
    pub fn find_all(&self, collection: &str) -> Vec<Document> {
        self.metrics.record_query();
        self.lookup(collection)
            .map(|c| c.find_all())
            .unwrap_or_default()
    }

    /// Number of documents (0 for an absent collection)
    pub fn count(&self, collection: &str) -> usize {
        self.lookup(collection).map(|c| c.len()).unwrap_or(0)
    }

    /// Distinct values of `field`, sorted by kind then value
    pub fn distinct(&self, collection: &str, field: &str) -> Vec<ScalarValue> {
        self.metrics.record_query();
        self.lookup(collection)
            .map(|c| c.distinct(field))
            .unwrap_or_default()
    }

    /// Fields of a collection that have an index, sorted
    pub fn indexed_fields(&self, collection: &str) -> Vec<String> {
        self.lookup(collection)
            .map(|c| c.indexed_fields())
            .unwrap_or_default()
    }

    /// Verify that a collection's indexes agree with its documents
    ///
    /// An absent collection is trivially consistent.
    ///
    /// # Errors
    /// `Error::InvariantViolation` on divergence.
    pub fn check_integrity(&self, collection: &str) -> Result<()> {
        match self.lookup(collection) {
            Some(c) => c.check_integrity(),
            None => Ok(()),
        }
    }
}
